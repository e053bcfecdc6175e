use serde_json::json;
use spark_mvvm::{Node, Vm};
use std::sync::{Arc, Mutex};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// Records the message and level of every event
struct Capture {
    events: Arc<Mutex<Vec<(tracing::Level, String)>>>,
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Msg {
            message: Option<String>,
        }
        impl tracing::field::Visit for Msg {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_string());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                }
            }
        }

        let mut msg = Msg { message: None };
        event.record(&mut msg);
        if let Some(message) = msg.message {
            self.events
                .lock()
                .expect("capture lock")
                .push((*event.metadata().level(), message));
        }
    }
}

fn capture() -> (Arc<Mutex<Vec<(tracing::Level, String)>>>, tracing::subscriber::DefaultGuard) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(Capture {
        events: Arc::clone(&events),
    });
    (events, tracing::subscriber::set_default(subscriber))
}

#[test]
fn test_failed_binding_logs_a_warning() {
    let (events, _guard) = capture();

    let vm = Vm::new(json!({ "a": 1 })).unwrap();
    let root = Node::element("div")
        .with_child(Node::element("p").with_attr("v-text", "missing.deep"))
        .with_child(Node::element("p").with_attr("v-text", "a"));
    let view = vm.mount(&root).unwrap();
    assert_eq!(view.errors().len(), 1);

    let events = events.lock().expect("capture lock");
    let warnings: Vec<_> = events
        .iter()
        .filter(|(level, _)| *level == tracing::Level::WARN)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].1, "binding skipped");
    assert!(events.iter().any(|(_, m)| m == "compile.done"));
}

#[test]
fn test_callback_dispatch_and_rerender_are_logged() {
    let (events, _guard) = capture();

    let vm = Vm::new(json!({ "items": ["a"] })).unwrap();
    let root = Node::element("ul")
        .with_child(Node::element("li").with_attr("v-for", "x in items").with_attr("v-text", "x"));
    let _view = vm.mount(&root).unwrap();

    let items = vm.get("items").unwrap();
    items.as_array().unwrap().push("b").unwrap();

    let events = events.lock().expect("capture lock");
    let renders = events.iter().filter(|(_, m)| m == "for.render").count();
    assert_eq!(renders, 2, "initial render plus one re-render");
    assert!(events.iter().any(|(_, m)| m == "dep.notify"));
}
