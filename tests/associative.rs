//! Integration tests for associative argument delivery.

mod common;

use common::{ALICE, Harness};
use slcmd::Value;
use slcmd::handlers::core::{ArgKey, Arguments};

#[test]
fn test_tagged_and_untagged_keys() {
    let h = Harness::new();
    let (listener, calls) = h.recorder("give", "i|s|g");
    {
        let mut l = listener.borrow_mut();
        l.set_associative(true);
        l.set_tags(["amount", ""]).unwrap();
    }

    assert_eq!(h.dispatcher.run(ALICE, "give 3 apple for the road"), 1);
    let calls = calls.borrow();
    let args = &calls[0];
    assert!(args.is_associative());
    assert_eq!(args.by_tag("amount"), Some(&Value::Integer(3)));
    assert_eq!(args.get(1), Some(&Value::from("apple")));
    assert_eq!(args.get(2), Some(&Value::from("for the road")));
    assert_eq!(args.len(), 3);
}

#[test]
fn test_positional_by_default() {
    let h = Harness::new();
    let (_, calls) = h.recorder("list", "s|s");
    h.dispatcher.run(ALICE, "list x y");
    assert_eq!(
        calls.borrow()[0],
        Arguments::Positional(vec![Value::from("x"), Value::from("y")])
    );
}

#[test]
fn test_associative_map_contents() {
    let h = Harness::new();
    let (listener, calls) = h.recorder("set", "s|b");
    {
        let mut l = listener.borrow_mut();
        l.set_associative(true);
        l.set_tags(["key", "value"]).unwrap();
    }
    h.dispatcher.run(ALICE, "set verbose on");
    match &calls.borrow()[0] {
        Arguments::Associative(map) => {
            assert_eq!(map.get(&ArgKey::Tag("key".into())), Some(&Value::from("verbose")));
            assert_eq!(map.get(&ArgKey::Tag("value".into())), Some(&Value::Boolean(true)));
        }
        other => panic!("expected associative arguments, got {other:?}"),
    }
}
