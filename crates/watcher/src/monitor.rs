//! Change monitor: turns notifications into change sets

use crate::changeset::ChangeSetBuilder;
use crate::platform::NotifySource;
use crate::{ChangeSet, EventCollector, PathFilter, Shutdown, WatchConfig, WatchError, WatchRegistry};
use tracing::debug;

/// Owns the notification source and the registry built on top of it
pub struct ChangeMonitor<S> {
    source: S,
    registry: WatchRegistry,
    filter: PathFilter,
    collector: EventCollector,
}

impl<S: NotifySource> ChangeMonitor<S> {
    /// Validate `config` and watch its roots recursively
    pub fn new(mut source: S, config: &WatchConfig, shutdown: Shutdown) -> Result<Self, WatchError> {
        config.validate()?;
        let filter = PathFilter::from_config(&config.filter)?;
        let registry = WatchRegistry::seed(&mut source, &config.roots, &filter)?;

        Ok(Self {
            source,
            registry,
            filter,
            collector: EventCollector::new(config.debounce(), shutdown),
        })
    }

    /// Number of directories being watched
    pub fn monitor_count(&self) -> usize {
        self.registry.count()
    }

    /// Block until something changes and return the filtered change set
    ///
    /// The set may be empty when every event was filtered out.
    pub fn next_change_set(&mut self) -> Result<ChangeSet, WatchError> {
        let events = self.collector.next_batch(&mut self.source)?;
        let changes = self.build(events);
        debug!(paths = changes.len(), watches = self.registry.count(), "Change set ready");
        Ok(changes)
    }

    /// Take and return whatever changed since the last read, without waiting
    ///
    /// Directory bookkeeping still happens for the drained events.
    pub fn clear(&mut self) -> Result<ChangeSet, WatchError> {
        let events = self.collector.drain_pending(&mut self.source)?;
        Ok(self.build(events))
    }

    fn build(&mut self, events: Vec<crate::RawEvent>) -> ChangeSet {
        ChangeSetBuilder::new(&mut self.source, &mut self.registry, &self.filter).build(events)
    }

    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::FsChange;
    use crate::platform::InMemorySource;
    use std::path::Path;

    fn monitor(config: WatchConfig) -> (ChangeMonitor<InMemorySource>, crate::InMemoryController) {
        let source = InMemorySource::new();
        let control = source.controller();
        (ChangeMonitor::new(source, &config, Shutdown::new()).unwrap(), control)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = ChangeMonitor::new(InMemorySource::new(), &WatchConfig::default(), Shutdown::new());
        assert!(matches!(result, Err(WatchError::InvalidConfig { .. })));
    }

    #[test]
    fn test_nested_directories_are_tracked_across_cycles() {
        let mut config = WatchConfig::new(["/w"]);
        config.delay_secs = 0.0;
        let (mut monitor, control) = monitor(config);

        control.schedule_burst([FsChange::create_dir("/w/a")]);
        control.schedule_burst([FsChange::create_dir("/w/a/b")]);
        control.schedule_burst([FsChange::create_file("/w/a/b/c.po")]);

        assert!(monitor.next_change_set().unwrap().contains(Path::new("/w/a")));
        assert!(monitor.next_change_set().unwrap().contains(Path::new("/w/a/b")));
        assert!(monitor.next_change_set().unwrap().contains(Path::new("/w/a/b/c.po")));
        assert_eq!(monitor.monitor_count(), 3);
    }

    #[test]
    fn test_clear_applies_directory_bookkeeping() {
        let mut config = WatchConfig::new(["/w"]);
        config.delay_secs = 0.0;
        let (mut monitor, control) = monitor(config);

        control.apply_now([FsChange::create_dir("/w/made-by-handler")]);
        let discarded = monitor.clear().unwrap();

        assert!(discarded.contains(Path::new("/w/made-by-handler")));
        assert!(control.is_watched(Path::new("/w/made-by-handler")));
        assert!(monitor.clear().unwrap().is_empty());
    }

    #[test]
    fn test_moving_a_directory_away_unwatches_its_subtree() {
        let mut config = WatchConfig::new(["/w"]);
        config.delay_secs = 0.0;
        let (mut monitor, control) = monitor(config);

        control.schedule_burst([FsChange::create_dir("/w/a")]);
        control.schedule_burst([FsChange::create_dir("/w/a/b")]);
        control.schedule_burst([FsChange::move_dir_out("/w/a")]);
        for _ in 0..3 {
            monitor.next_change_set().unwrap();
        }

        assert_eq!(monitor.registry().paths().collect::<Vec<_>>(), vec![Path::new("/w")]);
        assert!(!control.is_watched(Path::new("/w/a/b")));
        assert_eq!(control.watch_count(), 1);
    }
}
