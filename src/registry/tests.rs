// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests {
    use crate::context::{ApplicationContext, Area, ContextFields, Stakeholder, SystemContextStripped};
    use crate::registry::ContextRegistry;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lookup_miss_returns_defaults() {
        let registry = ContextRegistry::new();

        assert_eq!(
            registry.lookup("src/a.rs", Stakeholder::User),
            ContextFields::Application(ApplicationContext::new("unknown", "unknown", "unknown"))
        );
        assert_eq!(
            registry.lookup("src/a.rs", Stakeholder::System),
            ContextFields::System(SystemContextStripped::new(Area::Unknown))
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_and_lookup_per_stakeholder() {
        let registry = ContextRegistry::new();
        let app = ApplicationContext::new("pod1", "DSB", "Manual");

        registry.register("src/a.rs", app.clone().into());
        registry.register("src/a.rs", Area::Execution.into());

        assert_eq!(registry.application("src/a.rs"), app);
        assert_eq!(registry.system("src/a.rs").area, Area::Execution);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("src/a.rs", Stakeholder::User));
        assert!(registry.contains("src/a.rs", Stakeholder::System));
    }

    #[test]
    fn test_entries_are_scoped_by_file() {
        let registry = ContextRegistry::new();
        registry.register("src/a.rs", Area::Resilience.into());

        assert_eq!(registry.system("src/a.rs").area, Area::Resilience);
        assert_eq!(registry.system("src/b.rs").area, Area::Unknown);
        assert!(!registry.contains("src/b.rs", Stakeholder::System));
    }

    #[test]
    fn test_registration_overwrites() {
        let registry = ContextRegistry::new();
        registry.register("src/a.rs", ApplicationContext::new("pod1", "DSB", "Manual").into());
        registry.register("src/a.rs", ApplicationContext::new("pod1", "DSB", "Auto").into());

        assert_eq!(registry.application("src/a.rs").degradation_mode, "Auto");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear_resets_everything() {
        let registry = ContextRegistry::new();
        registry.register("src/a.rs", Area::Operation.into());
        registry.register("src/b.rs", ApplicationContext::new("u", "c", "d").into());

        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(registry.system("src/a.rs").area, Area::Unknown);
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(ContextRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let file = format!("src/worker_{i}.rs");
                    registry.register(&file, Area::Orchestration.into());
                    registry.system(&file)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().area, Area::Orchestration);
        }
        assert_eq!(registry.len(), 8);
    }
}
