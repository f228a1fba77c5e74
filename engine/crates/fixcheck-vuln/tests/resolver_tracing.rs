//! Tracing output of the resolver

use fixcheck_core::AdvisoryCollection;
use fixcheck_vuln::FixedAdvisoryResolver;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

const RHEL8: &str = "cpe:/o:redhat:enterprise_linux:8";

#[derive(Debug)]
struct RecordedSpan {
    name: &'static str,
    fields: Vec<(String, String)>,
}

/// Layer keeping every new span and the span each event was emitted in
#[derive(Clone, Default)]
struct Recorder {
    spans: Arc<Mutex<Vec<RecordedSpan>>>,
    event_parents: Arc<Mutex<Vec<Option<String>>>>,
}

struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{:?}", value)));
    }
}

impl<S> Layer<S> for Recorder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut fields = Vec::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        self.spans.lock().unwrap().push(RecordedSpan {
            name: attrs.metadata().name(),
            fields,
        });
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let parent = ctx.event_span(event).map(|span| span.name().to_string());
        self.event_parents.lock().unwrap().push(parent);
    }
}

fn feed() -> AdvisoryCollection {
    AdvisoryCollection::from_json(
        r#"[
            {
                "name": "CVE-2020-0001",
                "affected_release": [
                    {"package": "bash-4.4-20.el8", "cpe": "cpe:/o:redhat:enterprise_linux:8"}
                ]
            }
        ]"#,
    )
    .unwrap()
}

#[test]
fn list_inapplicable_runs_in_span_with_inputs() {
    let recorder = Recorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let resolver = FixedAdvisoryResolver::new(feed());

    let cves = tracing::subscriber::with_default(subscriber, || {
        resolver.list_inapplicable(RHEL8, "bash-4.4-23.el8")
    })
    .unwrap();
    assert_eq!(cves, vec!["CVE-2020-0001"]);

    let spans = recorder.spans.lock().unwrap();
    let span = spans
        .iter()
        .find(|s| s.name == "list_inapplicable")
        .expect("list_inapplicable span");
    assert!(span
        .fields
        .contains(&("distro".to_string(), RHEL8.to_string())));
    assert!(span
        .fields
        .contains(&("pkg".to_string(), "bash-4.4-23.el8".to_string())));

    // the resolution summary is emitted inside the call's span
    let parents = recorder.event_parents.lock().unwrap();
    assert!(!parents.is_empty());
    assert!(parents
        .iter()
        .any(|p| p.as_deref() == Some("list_inapplicable")));
}

#[test]
fn failed_parse_still_opens_span() {
    let recorder = Recorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let resolver = FixedAdvisoryResolver::new(feed());

    let result = tracing::subscriber::with_default(subscriber, || {
        resolver.list_inapplicable("rhel8", "bash-4.4-23.el8")
    });
    assert!(result.unwrap_err().is_parse());

    let spans = recorder.spans.lock().unwrap();
    let span = spans
        .iter()
        .find(|s| s.name == "list_inapplicable")
        .expect("list_inapplicable span");
    assert!(span
        .fields
        .contains(&("distro".to_string(), "rhel8".to_string())));
}
