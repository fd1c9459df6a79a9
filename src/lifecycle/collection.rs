use super::errors::LifecycleResult;
use super::machine::{ComponentLifecycle, Managed};
use super::states::ComponentState;
use tracing::warn;

/// Ordered set of child components driven together by a parent
///
/// Initialisation and start are all-or-nothing: when one child fails, the children
/// already moved are rolled back before the error is returned.
#[derive(Debug)]
pub struct ManagedCollection<C> {
    members: Vec<Managed<C>>,
}

impl<C> Default for ManagedCollection<C> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<C: ComponentLifecycle> ManagedCollection<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, member: Managed<C>) {
        self.members.push(member);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Managed<C>> {
        self.members.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Managed<C>> {
        self.members.iter_mut()
    }

    pub fn find(&self, name: &str) -> Option<&Managed<C>> {
        self.members.iter().find(|m| m.name() == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Managed<C>> {
        self.members.iter_mut().find(|m| m.name() == name)
    }

    pub fn init_all(&mut self) -> LifecycleResult<()> {
        for index in 0..self.members.len() {
            if let Err(e) = self.members[index].request_init() {
                for member in &mut self.members[..index] {
                    close_quietly(member);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn start_all(&mut self) -> LifecycleResult<()> {
        self.start_where(|_| true)
    }

    /// Start the members accepted by `filter`, rolling back on failure
    pub fn start_where<P>(&mut self, filter: P) -> LifecycleResult<()>
    where
        P: Fn(&Managed<C>) -> bool,
    {
        let mut started: Vec<usize> = Vec::new();
        for index in 0..self.members.len() {
            if !filter(&self.members[index]) {
                continue;
            }
            let was_started = self.members[index].state() == ComponentState::Started;
            if let Err(e) = self.members[index].request_start() {
                for &rollback in &started {
                    stop_quietly(&mut self.members[rollback]);
                }
                return Err(e);
            }
            if !was_started {
                started.push(index);
            }
        }
        Ok(())
    }

    pub fn stop_all(&mut self) {
        for member in self.members.iter_mut().rev() {
            stop_quietly(member);
        }
    }

    pub fn close_all(&mut self) {
        for member in self.members.iter_mut().rev() {
            close_quietly(member);
        }
    }
}

fn stop_quietly<C: ComponentLifecycle>(member: &mut Managed<C>) {
    if let Err(e) = member.request_stop() {
        warn!(component = %member.name(), error = %e, "Failed to stop child component");
    }
}

fn close_quietly<C: ComponentLifecycle>(member: &mut Managed<C>) {
    if let Err(e) = member.request_close() {
        warn!(component = %member.name(), error = %e, "Failed to close child component");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::errors::{component_error, LifecycleResult};

    struct Child {
        fail_init: bool,
        fail_start: bool,
    }

    impl ComponentLifecycle for Child {
        fn init(&mut self) -> LifecycleResult<()> {
            if self.fail_init {
                return Err(component_error("cannot init"));
            }
            Ok(())
        }

        fn start(&mut self) -> LifecycleResult<()> {
            if self.fail_start {
                return Err(component_error("cannot start"));
            }
            Ok(())
        }
    }

    fn child(name: &str, fail_init: bool, fail_start: bool) -> Managed<Child> {
        Managed::new(
            name,
            Child {
                fail_init,
                fail_start,
            },
        )
    }

    #[test]
    fn test_init_failure_rolls_back_earlier_children() {
        let mut children = ManagedCollection::new();
        children.push(child("a", false, false));
        children.push(child("b", true, false));

        assert!(children.init_all().is_err());
        assert!(children
            .iter()
            .all(|c| c.state() == ComponentState::Closed));
    }

    #[test]
    fn test_start_failure_stops_started_children() {
        let mut children = ManagedCollection::new();
        children.push(child("a", false, false));
        children.push(child("b", false, true));
        children.init_all().unwrap();

        assert!(children.start_all().is_err());
        assert_eq!(children.find("a").unwrap().state(), ComponentState::Stopped);
        assert_eq!(
            children.find("b").unwrap().state(),
            ComponentState::Initialised
        );

        children.close_all();
        assert!(children
            .iter()
            .all(|c| c.state() == ComponentState::Closed));
    }

    #[test]
    fn test_start_failure_keeps_members_that_were_already_started() {
        let mut children = ManagedCollection::new();
        children.push(child("running", false, false));
        children.push(child("fresh", false, false));
        children.push(child("broken", false, true));
        children.init_all().unwrap();
        children.find_mut("running").unwrap().request_start().unwrap();

        assert!(children.start_all().is_err());
        assert_eq!(
            children.find("running").unwrap().state(),
            ComponentState::Started
        );
        assert_eq!(children.find("fresh").unwrap().state(), ComponentState::Stopped);
    }

    #[test]
    fn test_start_where_skips_filtered_members() {
        let mut children = ManagedCollection::new();
        children.push(child("auto", false, false));
        children.push(child("manual", false, false));
        children.init_all().unwrap();

        children.start_where(|c| c.name() == "auto").unwrap();
        assert_eq!(children.find("auto").unwrap().state(), ComponentState::Started);
        assert_eq!(
            children.find("manual").unwrap().state(),
            ComponentState::Initialised
        );
    }
}
