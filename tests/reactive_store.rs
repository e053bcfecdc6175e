use serde_json::json;
use spark_mvvm::{
    is_tracking, observe, with_context, BindError, Dep, ReactiveArray, ReactiveObject, Scope,
    Subscriber, Value, Watcher,
};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Log = Rc<RefCell<Vec<(serde_json::Value, serde_json::Value)>>>;

fn watch(data: &ReactiveObject, path: &str, log: &Log) -> Watcher {
    let log = log.clone();
    Watcher::new(Scope::new(data.clone()), path, move |_, new, old| {
        log.borrow_mut().push((new.to_json(), old.to_json()));
        Ok(())
    })
    .unwrap()
}

/// Counts updates delivered by one Dep
struct Counter {
    id: u64,
    hits: Cell<usize>,
}

impl Subscriber for Counter {
    fn id(&self) -> u64 {
        self.id
    }

    fn add_dependency(&self, _dep: &Rc<Dep>) {}

    fn update(&self) -> spark_mvvm::Result<()> {
        self.hits.set(self.hits.get() + 1);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn counter_on(list: &ReactiveArray) -> Rc<Counter> {
    let counter = Rc::new(Counter {
        id: with_context(|ctx| ctx.next_subscriber_id()),
        hits: Cell::new(0),
    });
    list.dep()
        .add_subscriber(Rc::downgrade(&(counter.clone() as Rc<dyn Subscriber>)));
    counter
}

#[test]
fn test_wrapping_twice_yields_the_same_store() {
    let wrapped = observe(json!({ "a": { "b": 1 } }));
    let again = observe(wrapped.clone());
    let object = wrapped.as_object().unwrap();

    assert!(object.ptr_eq(again.as_object().unwrap()));

    // Instrumentation is not duplicated: one watcher, one subscription
    let log = Log::default();
    let _w = watch(object, "a.b", &log);
    let inner = object.get("a").unwrap();
    assert_eq!(inner.as_object().unwrap().subscriber_count("b"), Some(1));
}

#[test]
fn test_read_tracks_write_notifies_once() {
    let data = ReactiveObject::from_json(json!({ "a": { "b": 1 } }));
    let log = Log::default();
    let _w = watch(&data, "a.b", &log);

    let a = data.get("a").unwrap();
    a.as_object().unwrap().set("b", 2).unwrap();
    assert_eq!(*log.borrow(), vec![(json!(2), json!(1))]);

    a.as_object().unwrap().set("b", 2).unwrap();
    assert_eq!(log.borrow().len(), 1, "same value must not notify");
}

#[test]
fn test_every_list_mutation_notifies_once() {
    let list = match observe(json!([3, 1, 2])) {
        Value::Array(list) => list,
        other => panic!("expected a list, got {other:?}"),
    };
    let counter = counter_on(&list);
    let mut expected = 0;
    let mut step = |op: &dyn Fn(&ReactiveArray)| {
        op(&list);
        expected += 1;
        assert_eq!(counter.hits.get(), expected);
    };

    step(&|l| {
        l.push(json!({ "done": false })).unwrap();
    });
    step(&|l| {
        l.pop().unwrap();
    });
    step(&|l| {
        l.shift().unwrap();
    });
    step(&|l| {
        l.unshift(json!({ "done": false })).unwrap();
    });
    step(&|l| {
        l.splice(1, 0, vec![Value::from(7)]).unwrap();
    });
    step(&|l| l.sort().unwrap());
    step(&|l| l.reverse().unwrap());
}

#[test]
fn test_inserted_elements_are_reactive() {
    let data = ReactiveObject::from_json(json!({ "todos": [] }));
    let todos = data.get("todos").unwrap();
    let todos = todos.as_array().unwrap();

    todos.push(json!({ "title": "milk" })).unwrap();
    todos
        .splice(0, 0, vec![Value::from_json(json!({ "title": "eggs" }))])
        .unwrap();

    let log = Log::default();
    let _w = watch(&data, "todos.1.title", &log);

    let milk = todos.get(1).unwrap();
    milk.as_object().unwrap().set("title", "oat milk").unwrap();
    assert_eq!(*log.borrow(), vec![(json!("oat milk"), json!("milk"))]);
}

#[test]
fn test_two_watchers_same_path_in_registration_order() {
    let data = ReactiveObject::from_json(json!({ "a": 1 }));
    let order = Rc::new(RefCell::new(Vec::new()));

    let first = {
        let order = order.clone();
        Watcher::new(Scope::new(data.clone()), "a", move |_, _, _| {
            order.borrow_mut().push("first");
            Ok(())
        })
        .unwrap()
    };
    let second = {
        let order = order.clone();
        Watcher::new(Scope::new(data.clone()), "a", move |_, _, _| {
            order.borrow_mut().push("second");
            Ok(())
        })
        .unwrap()
    };

    data.set("a", 2).unwrap();
    assert_eq!(*order.borrow(), vec!["first", "second"]);
    assert_ne!(first.id(), second.id());
}

#[test]
fn test_cursor_is_clear_after_success_and_failure() {
    let data = ReactiveObject::from_json(json!({ "a": { "b": 1 } }));
    let log = Log::default();

    let _ok = watch(&data, "a.b", &log);
    assert!(!is_tracking());

    let err = Watcher::new(Scope::new(data.clone()), "a.missing.deep", |_, _, _| Ok(())).unwrap_err();
    assert_eq!(err, BindError::not_found("missing", "a.missing.deep"));
    assert!(!is_tracking());

    // A read right after the failure must not subscribe anybody
    let _ = data.get("a");
    assert_eq!(data.subscriber_count("a"), Some(1));
}

#[test]
fn test_dropped_watcher_stops_listening() {
    let data = ReactiveObject::from_json(json!({ "a": 1 }));
    let log = Log::default();

    {
        let _w = watch(&data, "a", &log);
        data.set("a", 2).unwrap();
    }

    data.set("a", 3).unwrap();
    assert_eq!(log.borrow().len(), 1, "dropped watcher must stop firing");
}
