use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    registrations_created: AtomicU64,
    registrations_rejected: AtomicU64,
    evidence_submissions: AtomicU64,
    payment_status_changes: AtomicU64,
    check_ins_first: AtomicU64,
    check_ins_repeat: AtomicU64,
    notification_attempts: AtomicU64,
    notification_failures: AtomicU64,
}

impl Metrics {
    pub fn record_registration(&self) {
        self.registrations_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration_rejected(&self) {
        self.registrations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evidence(&self) {
        self.evidence_submissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_status_change(&self) {
        self.payment_status_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_check_in(&self, first: bool) {
        if first {
            self.check_ins_first.fetch_add(1, Ordering::Relaxed);
        } else {
            self.check_ins_repeat.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_notification(&self, success: bool) {
        self.notification_attempts.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.notification_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn check_ins(&self) -> (u64, u64) {
        (
            self.check_ins_first.load(Ordering::Relaxed),
            self.check_ins_repeat.load(Ordering::Relaxed),
        )
    }

    pub fn render_prometheus(&self) -> String {
        let counters = [
            ("turnout_registrations_created_total", &self.registrations_created),
            ("turnout_registrations_rejected_total", &self.registrations_rejected),
            ("turnout_payment_evidence_total", &self.evidence_submissions),
            ("turnout_payment_status_changes_total", &self.payment_status_changes),
            ("turnout_check_ins_first_total", &self.check_ins_first),
            ("turnout_check_ins_repeat_total", &self.check_ins_repeat),
            ("turnout_notification_attempts_total", &self.notification_attempts),
            ("turnout_notification_failures_total", &self.notification_failures),
        ];
        let mut out = String::new();
        for (name, counter) in counters {
            out.push_str(&format!(
                "# TYPE {name} counter\n{name} {}\n",
                counter.load(Ordering::Relaxed)
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_every_counter() {
        let metrics = Metrics::default();
        metrics.record_check_in(true);
        metrics.record_check_in(false);
        metrics.record_check_in(false);
        metrics.record_notification(false);
        let text = metrics.render_prometheus();
        assert!(text.contains("turnout_check_ins_first_total 1\n"));
        assert!(text.contains("turnout_check_ins_repeat_total 2\n"));
        assert!(text.contains("turnout_notification_failures_total 1\n"));
        assert!(text.contains("# TYPE turnout_registrations_created_total counter\n"));
    }
}
