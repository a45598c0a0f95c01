/// How a single structure scan ended, as seen by progress observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Found,
    Empty,
    Failed,
}

#[derive(Debug, Clone)]
pub enum Progress {
    TaskStart { total_steps: u64 },
    StructureScanned { identifier: String, status: ScanStatus },
    TaskFinish,
    /// Free-form note for the user, e.g. why a structure failed.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::Message("nobody listens".into()));
    }

    #[test]
    fn reporter_forwards_events_to_callback() {
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::StructureScanned { identifier, status } = event {
                seen.lock().unwrap().push((identifier, status));
            }
        }));

        reporter.report(Progress::TaskStart { total_steps: 1 });
        reporter.report(Progress::StructureScanned {
            identifier: "1CA2".into(),
            status: ScanStatus::Found,
        });
        reporter.report(Progress::TaskFinish);
        drop(reporter);

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![("1CA2".to_string(), ScanStatus::Found)]
        );
    }
}
