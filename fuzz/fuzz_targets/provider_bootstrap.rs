#![no_main]

use ferrous_container::{Binding, Container, DiResult, Arguments, Provided, ProviderRef, ServiceProvider};
use libfuzzer_sys::fuzz_target;
use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const SERVICES: [&str; 4] = ["svc0", "svc1", "svc2", "svc3"];

#[derive(Default)]
struct Counters {
    registered: AtomicUsize,
    booted: AtomicUsize,
}

struct FuzzProvider {
    id: usize,
    deferred: bool,
    counters: Arc<Counters>,
}

impl ServiceProvider for FuzzProvider {
    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("fuzz{}", self.id))
    }

    fn register(&self, container: &Container) -> DiResult<()> {
        self.counters.registered.fetch_add(1, Ordering::SeqCst);
        container.add(SERVICES[self.id], Binding::value(self.id));
        Ok(())
    }

    fn boot(&self, _container: &Container, _args: &Arguments) -> DiResult<()> {
        self.counters.booted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn provides(&self) -> Vec<Provided> {
        if self.deferred {
            vec![Provided::from(SERVICES[self.id])]
        } else {
            Vec::new()
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let container = Container::new();
    let counters: Vec<Arc<Counters>> = (0..SERVICES.len()).map(|_| Arc::default()).collect();
    let mut added = [false; 4];

    for pair in data.chunks_exact(2) {
        let id = (pair[1] & 3) as usize;
        match pair[0] % 3 {
            0 => {
                let provider = FuzzProvider {
                    id,
                    deferred: pair[1] & 0x80 != 0,
                    counters: counters[id].clone(),
                };
                container.add_service_provider(ProviderRef::instance(provider)).unwrap();
                added[id] = true;
            }
            1 => {
                container.bootstrap().unwrap();
            }
            _ => {
                let result = container.get::<usize>(SERVICES[id]);
                if added[id] && container.is_bootstrapped() {
                    assert_eq!(*result.unwrap(), id);
                }
            }
        }

        for c in &counters {
            assert!(c.registered.load(Ordering::SeqCst) <= 1);
            assert!(c.booted.load(Ordering::SeqCst) <= 1);
        }
    }
});
