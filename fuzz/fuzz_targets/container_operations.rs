#![no_main]

use ferrous_container::{Binding, Callable, Container};
use libfuzzer_sys::fuzz_target;
use std::collections::HashMap;
use std::sync::Arc;

const KEYS: [&str; 4] = ["key0", "key1", "key2", "key3"];
const ALIASES: [&str; 4] = ["alias0", "alias1", "alias2", "alias3"];

/// Reference model: aliases only ever point at plain keys, so lookups never cycle.
#[derive(Default)]
struct Model {
    entries: HashMap<&'static str, u32>,
    aliases: HashMap<&'static str, &'static str>,
}

impl Model {
    fn lookup(&self, key: &str) -> Option<u32> {
        let target = self.aliases.get(key).copied().unwrap_or(key);
        self.entries.get(target).copied()
    }
}

fn any_key(byte: u8) -> &'static str {
    if byte & 0x80 == 0 {
        KEYS[(byte & 3) as usize]
    } else {
        ALIASES[(byte & 3) as usize]
    }
}

fuzz_target!(|data: &[u8]| {
    let container = Container::new();
    let mut model = Model::default();

    for chunk in data.chunks_exact(3) {
        let (op, selector, value) = (chunk[0] % 7, chunk[1], u32::from(chunk[2]));

        match op {
            0 => {
                let key = any_key(selector);
                container.add(key, Binding::value(value));
                model.aliases.remove(key);
                model.entries.insert(key, value);
            }
            1 => {
                let key = any_key(selector);
                container.share(key, Callable::new(move |_| Ok(value)));
                model.aliases.remove(key);
                model.entries.insert(key, value);
            }
            2 => {
                let alias = ALIASES[(selector & 3) as usize];
                let target = KEYS[(chunk[2] & 3) as usize];
                container.alias(alias, target);
                model.entries.remove(alias);
                model.aliases.insert(alias, target);
            }
            3 => {
                let key = any_key(selector);
                container.remove(key);
                model.entries.remove(key);
                model.aliases.remove(key);
            }
            4 => {
                // Integer keys live in their own space and never disturb named ones
                let pushed = container.push(Binding::value(value));
                assert_eq!(*container.get::<u32>(pushed).unwrap(), value);
            }
            5 => {
                let key = any_key(selector);
                assert_eq!(container.has(key), model.lookup(key).is_some());
            }
            _ => {
                let key = any_key(selector);
                match (container.get::<u32>(key), model.lookup(key)) {
                    (Ok(actual), Some(expected)) => {
                        assert_eq!(*actual, expected);
                        let again = container.get::<u32>(key).unwrap();
                        assert_eq!(*again, expected);
                        if container.descriptors().iter().any(|d| d.is_shared() && d.name() == key) {
                            assert!(Arc::ptr_eq(&actual, &again));
                        }
                    }
                    (Err(err), None) => assert!(err.is_not_found()),
                    (actual, expected) => panic!("diverged on {}: {:?} vs {:?}", key, actual.is_ok(), expected),
                }
            }
        }
    }
});
