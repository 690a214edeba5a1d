/// Unit tests for Key
///
/// Conversions, display names and ordering.

use ferrous_container::Key;
use std::borrow::Cow;
use std::collections::HashSet;

struct Database;
trait Logger {}

#[test]
fn test_conversions() {
    assert_eq!(Key::from("foo"), Key::Name(Cow::Borrowed("foo")));
    assert_eq!(Key::from(String::from("foo")), Key::from("foo"));
    assert_eq!(Key::from(Cow::Borrowed("foo")), Key::name("foo"));
    assert_eq!(Key::from(7usize), Key::Index(7));

    let key = Key::from("bar");
    assert_eq!(Key::from(&key), key);
}

#[test]
fn test_display_names() {
    assert_eq!(Key::from("config.db.url").to_string(), "config.db.url");
    assert_eq!(Key::Index(42).to_string(), "42");
    assert_eq!(Key::of::<Database>().to_string(), std::any::type_name::<Database>());
    assert_eq!(
        Key::interface::<dyn Logger>().display_name(),
        std::any::type_name::<dyn Logger>()
    );
}

#[test]
fn test_type_and_interface_keys() {
    let ty = Key::of::<Database>();
    assert!(ty.is_type());
    assert!(!ty.is_interface());
    assert_eq!(ty, Key::of::<Database>());
    assert_ne!(ty, Key::of::<String>());

    let iface = Key::interface::<dyn Logger>();
    assert!(iface.is_interface());
    assert!(!iface.is_type());
}

#[test]
fn test_name_and_index_do_not_collide() {
    assert_ne!(Key::from("0"), Key::Index(0));
    assert_eq!(Key::Index(3).as_index(), Some(3));
    assert_eq!(Key::from("3").as_index(), None);
}

#[test]
fn test_keys_hash_consistently() {
    let mut keys = HashSet::new();
    keys.insert(Key::from("foo"));
    keys.insert(Key::from(String::from("foo")));
    keys.insert(Key::Index(0));
    keys.insert(Key::of::<Database>());
    keys.insert(Key::of::<Database>());

    assert_eq!(keys.len(), 3);
}

#[test]
fn test_ordering_groups_by_variant() {
    let mut keys = vec![Key::Index(1), Key::from("b"), Key::Index(0), Key::from("a")];
    keys.sort();

    assert_eq!(keys, [Key::from("a"), Key::from("b"), Key::Index(0), Key::Index(1)]);
}
