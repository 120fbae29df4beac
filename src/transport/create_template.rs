use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::{
    Button, Category, Component, CreateTemplateResponse, ProviderTemplateId, Template,
    TemplateStatus,
};
use crate::transport::graph::TransportError;

/// Encode a template into the provider's create-template JSON body.
///
/// Components are emitted in the fixed header, body, footer, buttons order
/// with upper-case type tags.
pub fn encode_create_template_body(template: &Template) -> Value {
    let components: Vec<Value> = template.components().iter().map(component_value).collect();
    json!({
        "name": template.name().as_str(),
        "language": template.language().as_str(),
        "category": template.category().wire_tag(),
        "components": components,
    })
}

fn component_value(component: &Component) -> Value {
    match component {
        Component::Header(text) => json!({
            "type": "HEADER",
            "format": "TEXT",
            "text": text.as_str(),
        }),
        Component::Body(text) => json!({
            "type": "BODY",
            "text": text.as_str(),
        }),
        Component::Footer(text) => json!({
            "type": "FOOTER",
            "text": text.as_str(),
        }),
        Component::Buttons(buttons) => {
            let buttons: Vec<Value> = buttons.iter().map(button_value).collect();
            json!({
                "type": "BUTTONS",
                "buttons": buttons,
            })
        }
    }
}

fn button_value(button: &Button) -> Value {
    match button {
        Button::QuickReply { text } => json!({
            "type": "QUICK_REPLY",
            "text": text.as_str(),
        }),
        Button::Url { text, url } => json!({
            "type": "URL",
            "text": text.as_str(),
            "url": url.as_str(),
        }),
        Button::Phone { text, phone } => json!({
            "type": "PHONE_NUMBER",
            "text": text.as_str(),
            "phone_number": phone.e164(),
        }),
    }
}

#[derive(Debug, Deserialize)]
struct WireCreateResponse {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

pub fn decode_create_template_response(
    json: &str,
) -> Result<CreateTemplateResponse, TransportError> {
    let parsed: WireCreateResponse = serde_json::from_str(json)?;
    let id = ProviderTemplateId::new(parsed.id)
        .map_err(|_| TransportError::Malformed("create response carried a blank template id"))?;
    Ok(CreateTemplateResponse {
        id,
        status: parsed
            .status
            .as_deref()
            .and_then(TemplateStatus::from_provider_tag),
        category: parsed.category.as_deref().and_then(Category::from_wire_tag),
    })
}
