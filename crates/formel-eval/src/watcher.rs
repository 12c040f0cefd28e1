//! Evaluation events and their observer.
//!
//! The namespace, the value stack, and the evaluator itself report
//! everything they do as [`Event`]s through the [`Informer`] channel.
//! A [`Watcher`] records the stream and can fold it into an aggregate
//! [`Report`]; the unit type `()` is the discard sink for callers who
//! do not care.

use std::collections::BTreeSet;

use serde::Serialize;

/// One observable step of an evaluation. String payloads carry the
/// display form of the values involved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Event {
    StackPush {
        value: String,
        caller: String,
        /// Stack size right after the push.
        size: usize,
    },
    StackPop {
        value: String,
        caller: String,
        /// Stack size right after the pop.
        size: usize,
    },
    NamespaceGet {
        key: String,
        value: Option<String>,
        caller: String,
    },
    NamespaceAssign {
        key: String,
        value: String,
        caller: String,
    },
    NamespaceOverwrite {
        key: String,
        previous: String,
        value: String,
        caller: String,
    },
    OperatorUse {
        operator: String,
        operation: String,
    },
    ZeroDivision {
        operation: String,
    },
    Call {
        name: String,
        operands: Vec<String>,
    },
}

/// The upward event channel.
pub trait Informer {
    fn inform(&mut self, event: Event);
}

/// The discard sink: evaluation without observation.
impl Informer for () {
    fn inform(&mut self, _event: Event) {}
}

/// Append-only event log with report aggregation.
#[derive(Debug, Default)]
pub struct Watcher {
    history: Vec<Event>,
}

impl Watcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded event, oldest first.
    pub fn history(&self) -> &[Event] {
        &self.history
    }

    /// Fold the history into aggregate counters.
    pub fn make_report(&self) -> Report {
        let mut report = Report::default();

        for event in &self.history {
            match event {
                Event::StackPush { size, .. } => {
                    report.stack.push += 1;
                    report.stack.max_size = report.stack.max_size.max(*size);
                }
                Event::StackPop { size, .. } => {
                    report.stack.pop += 1;
                    report.stack.max_size = report.stack.max_size.max(*size);
                }
                Event::NamespaceGet { key, .. } => {
                    report.namespace.get += 1;
                    report.namespace.names_get.insert(key.clone());
                }
                Event::NamespaceAssign { key, .. } => {
                    report.namespace.assign += 1;
                    report.namespace.names_assign.insert(key.clone());
                }
                Event::NamespaceOverwrite { key, .. } => {
                    report.namespace.overwrite += 1;
                    report.namespace.names_overwrite.insert(key.clone());
                }
                _ => {}
            }
        }

        let names: BTreeSet<&String> = report
            .namespace
            .names_get
            .iter()
            .chain(&report.namespace.names_assign)
            .chain(&report.namespace.names_overwrite)
            .collect();
        report.namespace.names = names.into_iter().cloned().collect();

        report
    }
}

impl Informer for Watcher {
    fn inform(&mut self, event: Event) {
        self.history.push(event);
    }
}

/// Aggregate view of one evaluation's events.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Report {
    pub stack: StackReport,
    pub namespace: NamespaceReport,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StackReport {
    pub push: usize,
    pub pop: usize,
    pub max_size: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NamespaceReport {
    pub get: usize,
    pub assign: usize,
    pub overwrite: usize,
    /// Sorted union of every key the evaluation touched.
    pub names: Vec<String>,
    pub names_get: BTreeSet<String>,
    pub names_assign: BTreeSet<String>,
    pub names_overwrite: BTreeSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watcher_records_in_order() {
        let mut watcher = Watcher::new();
        watcher.inform(Event::StackPush {
            value: "1".into(),
            caller: "тест".into(),
            size: 1,
        });
        watcher.inform(Event::StackPop {
            value: "1".into(),
            caller: "тест".into(),
            size: 0,
        });
        assert_eq!(watcher.history().len(), 2);
        assert!(matches!(watcher.history()[0], Event::StackPush { .. }));
    }

    #[test]
    fn report_counts_and_tracks_max_size() {
        let mut watcher = Watcher::new();
        for size in [1, 2, 3] {
            watcher.inform(Event::StackPush {
                value: "x".into(),
                caller: "тест".into(),
                size,
            });
        }
        watcher.inform(Event::StackPop {
            value: "x".into(),
            caller: "тест".into(),
            size: 2,
        });

        let report = watcher.make_report();
        assert_eq!(report.stack.push, 3);
        assert_eq!(report.stack.pop, 1);
        assert_eq!(report.stack.max_size, 3);
    }

    #[test]
    fn report_collects_namespace_names() {
        let mut watcher = Watcher::new();
        watcher.inform(Event::NamespaceAssign {
            key: "x".into(),
            value: "1".into(),
            caller: "тест".into(),
        });
        watcher.inform(Event::NamespaceGet {
            key: "y".into(),
            value: None,
            caller: "тест".into(),
        });
        watcher.inform(Event::NamespaceOverwrite {
            key: "x".into(),
            previous: "1".into(),
            value: "2".into(),
            caller: "тест".into(),
        });

        let report = watcher.make_report();
        assert_eq!(report.namespace.assign, 1);
        assert_eq!(report.namespace.get, 1);
        assert_eq!(report.namespace.overwrite, 1);
        assert_eq!(report.namespace.names, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn unit_informer_discards() {
        let mut sink = ();
        sink.inform(Event::ZeroDivision {
            operation: "1 / 0".into(),
        });
    }
}
