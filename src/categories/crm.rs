//! CRM blocks calling the `wix-crm-frontend` module

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::compiler::{payload, CompileError, Compiler, ObjectKey, ObjectTemplate};
use crate::core::block::{Block, BlockAction, BlockPiece, BlockType, Capability, Property};
use crate::core::registry::BlockKind;
use crate::core::types::ExpressionType;

use super::{decode, malformed, prop};

/// One template variable of a triggered e-mail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailVariable {
    pub key: Property,
    pub value: Property,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredEmailData {
    /// Send to a site member instead of a contact
    #[serde(default)]
    pub is_member: bool,
    pub email: Property,
    pub target: Property,
    #[serde(default)]
    pub variables: Vec<EmailVariable>,
}

/// `await triggeredEmails.emailContact(emailId, contactId, {variables})`.
pub struct SendTriggeredEmail;

impl BlockType for SendTriggeredEmail {
    fn capability(&self) -> Capability {
        Capability::Computation
    }

    fn color(&self) -> &'static str {
        "bg-yellow-500"
    }

    fn render(&self, data: &JsonValue) -> Vec<BlockPiece> {
        let Some(data) = decode::<TriggeredEmailData>(data) else {
            return malformed();
        };
        let recipient = if data.is_member {
            "to member"
        } else {
            "to contact"
        };
        let mut pieces: Vec<BlockPiece> = vec![
            "Send Email".into(),
            data.email.into(),
            recipient.into(),
            data.target.into(),
        ];
        if !data.variables.is_empty() {
            pieces.push("With variables:".into());
            for variable in data.variables {
                pieces.push(variable.key.into());
                pieces.push(":".into());
                pieces.push(variable.value.into());
            }
        }
        pieces
    }

    fn result_type(&self, _data: &JsonValue) -> Option<ExpressionType> {
        Some(ExpressionType::promise_of(ExpressionType::Void))
    }

    fn compile(&self, ctx: &mut Compiler, data: &JsonValue) -> Result<(), CompileError> {
        let mut data: TriggeredEmailData = payload(data)?;
        ctx.import_named("wix-crm-frontend", "triggeredEmails");
        ctx.require_async();
        ctx.write("await triggeredEmails.");
        ctx.write(if data.is_member {
            "emailMember"
        } else {
            "emailContact"
        });
        ctx.write("(");
        ctx.write_property(&mut data.email, true)?;
        ctx.write(", ");
        ctx.write_property(&mut data.target, true)?;
        let mut options = ObjectTemplate::Object(vec![(
            ObjectKey::name("variables"),
            ObjectTemplate::Object(
                data.variables
                    .into_iter()
                    .map(|variable| {
                        (
                            ObjectKey::Computed(variable.key),
                            ObjectTemplate::Value(variable.value),
                        )
                    })
                    .collect(),
            ),
        )]);
        if options.has_value() {
            ctx.write(", ");
            ctx.write_object(&mut options)?;
        }
        ctx.write(")");
        Ok(())
    }

    fn actions(&self, data: &JsonValue) -> Vec<BlockAction> {
        let Some(data) = decode::<TriggeredEmailData>(data) else {
            return Vec::new();
        };
        let is_member = data.is_member;
        let recipient_label = if is_member { "Contact" } else { "Member" };
        let has_variables = !data.variables.is_empty();
        let mut actions = vec![
            BlockAction::new(format!("Send to a {recipient_label}"), move |block| {
                let Some(current) = decode::<TriggeredEmailData>(&block.data) else {
                    return block.clone();
                };
                let mut target = current.target;
                target.label = if is_member { "Contact ID" } else { "Member ID" }.to_string();
                block.with_data(json!({ "isMember": !is_member, "target": target }))
            }),
            BlockAction::new("Add Variable", |block| {
                let Some(current) = decode::<TriggeredEmailData>(&block.data) else {
                    return block.clone();
                };
                let mut variables = current.variables;
                variables.push(EmailVariable {
                    key: prop("Key", ExpressionType::Text),
                    value: prop("Value", ExpressionType::Text),
                });
                block.with_data(json!({ "variables": variables }))
            }),
        ];
        if has_variables {
            actions.push(BlockAction::new("Remove Last Variable", |block| {
                let Some(current) = decode::<TriggeredEmailData>(&block.data) else {
                    return block.clone();
                };
                let mut variables = current.variables;
                variables.pop();
                block.with_data(json!({ "variables": variables }))
            }));
        }
        actions
    }
}

/// Palette templates for the CRM category.
pub fn palette() -> Vec<Block> {
    vec![Block::new(
        BlockKind::SendTriggeredEmail,
        TriggeredEmailData {
            is_member: false,
            email: prop("Email", ExpressionType::Text),
            target: prop("Contact ID", ExpressionType::Text),
            variables: Vec::new(),
        },
    )]
}
