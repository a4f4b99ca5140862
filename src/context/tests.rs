// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(test)]
mod tests {
    use crate::context::*;
    use serde_json::json;

    #[test]
    fn test_user_context_serializes_with_stakeholder_tag() {
        let context = Context::User(ApplicationContext::new("pod1", "DSB", "Manual"));
        let value = serde_json::to_value(&context).unwrap();

        assert_eq!(
            value,
            json!({
                "stakeholder": "USER",
                "contextFields": {"unit": "pod1", "component": "DSB", "degradationMode": "Manual"}
            })
        );
    }

    #[test]
    fn test_system_context_serializes_with_stakeholder_tag() {
        let context = Context::System(
            SystemContextStripped::new(Area::Execution).with_location("src/app.rs", "app::run"),
        );
        let value = serde_json::to_value(&context).unwrap();

        assert_eq!(value["stakeholder"], "SYSTEM");
        assert_eq!(value["contextFields"]["area"], "execution");
        assert_eq!(value["contextFields"]["file"], "src/app.rs");
        assert_eq!(value["contextFields"]["function"], "app::run");
    }

    #[test]
    fn test_context_round_trips_through_json() {
        let original = Context::User(ApplicationContext::new("pod2", "Gateway", "Auto"));
        let text = serde_json::to_string(&original).unwrap();
        let parsed: Context = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_defaults_are_unknown() {
        let app = ApplicationContext::default();
        assert_eq!(app.unit, UNKNOWN);
        assert_eq!(app.component, UNKNOWN);
        assert_eq!(app.degradation_mode, UNKNOWN);

        assert_eq!(SystemContextStripped::default().area, Area::Unknown);
    }

    #[test]
    fn test_default_for_matches_stakeholder() {
        assert_eq!(
            ContextFields::default_for(Stakeholder::User),
            ContextFields::Application(ApplicationContext::default())
        );
        assert_eq!(
            ContextFields::default_for(Stakeholder::System),
            ContextFields::System(SystemContextStripped::new(Area::Unknown))
        );
    }

    #[test]
    fn test_context_fields_stakeholder() {
        let app: ContextFields = ApplicationContext::new("u", "c", "d").into();
        let sys: ContextFields = Area::Resilience.into();

        assert_eq!(app.stakeholder(), Stakeholder::User);
        assert_eq!(sys.stakeholder(), Stakeholder::System);
    }

    #[test]
    fn test_stakeholder_parsing() {
        assert_eq!("user".parse::<Stakeholder>().unwrap(), Stakeholder::User);
        assert_eq!("SYSTEM".parse::<Stakeholder>().unwrap(), Stakeholder::System);
        assert!("operator".parse::<Stakeholder>().is_err());
        assert_eq!(Stakeholder::System.to_string(), "SYSTEM");
    }

    #[test]
    fn test_area_parsing_and_display() {
        for area in [
            Area::Execution,
            Area::Operation,
            Area::Orchestration,
            Area::Resilience,
            Area::Unknown,
        ] {
            assert_eq!(area.to_string().parse::<Area>().unwrap(), area);
        }
        assert!("storage".parse::<Area>().is_err());
    }

    #[test]
    fn test_log_entry_shape() {
        let entry = LogEntry {
            context: Context::User(ApplicationContext::new("pod1", "DSB", "Manual")),
            host: "production-pi1".to_string(),
            data: json!({"degradationReason": "DSB not reachable"}),
        };
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["host"], "production-pi1");
        assert_eq!(value["data"]["degradationReason"], "DSB not reachable");
        assert_eq!(value["context"]["stakeholder"], "USER");
    }
}
