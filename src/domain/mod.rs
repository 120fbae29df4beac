//! Domain layer: strong types with validation and invariants (no I/O).

mod component;
mod response;
mod template;
mod validation;
mod value;
pub mod variables;

pub use component::{
    Button, Buttons, Category, Component, ComponentKind, ComponentSet, MAX_BUTTONS,
    MAX_PHONE_BUTTONS, MAX_URL_BUTTONS, TemplateStatus,
};
pub use response::{CreateTemplateResponse, ProviderButton, ProviderComponent, ProviderTemplate};
pub use template::Template;
pub use validation::{ValidationError, ValidationWarning};
pub use value::{
    AccessToken, BodyText, ButtonText, FooterText, HeaderText, LanguageCode, PhoneTarget,
    ProviderTemplateId, TemplateName, UrlTarget, WabaId,
};
pub use variables::{VariableReport, validate_body};

#[cfg(test)]
mod tests {
    use super::*;

    fn body_component(text: &str) -> Component {
        Component::Body(BodyText::new(text).unwrap())
    }

    #[test]
    fn a_complete_template_assembles_from_parts() {
        let mut components = ComponentSet::new();
        components
            .add(Component::Header(HeaderText::new("Order update").unwrap()))
            .unwrap();
        components
            .add(body_component("Hello {{1}}, your order {{2}} is ready"))
            .unwrap();
        components
            .add(Component::Footer(
                FooterText::new("Reply STOP to opt out").unwrap(),
            ))
            .unwrap();
        components
            .add(Component::Buttons(
                Buttons::new(vec![Button::QuickReply {
                    text: ButtonText::new("Track it").unwrap(),
                }])
                .unwrap(),
            ))
            .unwrap();

        let template = Template::new(
            TemplateName::new("order_update").unwrap(),
            Category::Utility,
            LanguageCode::new("en").unwrap(),
            components,
        )
        .unwrap();

        assert_eq!(template.name().as_str(), "order_update");
        assert_eq!(template.language().as_str(), "en");
        assert_eq!(template.components().len(), 4);
    }

    #[test]
    fn body_placeholder_rules_apply_independently_of_length_caps() {
        // A body can satisfy the length cap while violating sequencing.
        let text = "Hello {{1}}, order {{4}} is ready";
        assert!(BodyText::new(text).is_ok());

        let report = validate_body(text);
        assert!(!report.is_valid());
        assert_eq!(report.placeholders, vec![1, 4]);
    }

    #[test]
    fn provider_template_status_maps_known_tags_only() {
        let remote = ProviderTemplate {
            id: None,
            name: "order_update".to_owned(),
            status_tag: "APPROVED".to_owned(),
            category: Some(Category::Utility),
            language: Some("en".to_owned()),
            components: vec![ProviderComponent::Body {
                text: "Your order is on the way".to_owned(),
            }],
        };
        assert_eq!(remote.status(), Some(TemplateStatus::Approved));

        let odd = ProviderTemplate {
            status_tag: "IN_APPEAL".to_owned(),
            ..remote
        };
        assert_eq!(odd.status(), None);
    }
}
