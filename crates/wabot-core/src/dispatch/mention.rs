//! Mention text builders.

use wabot_types::chat::{Contact, ContactId};

/// One `@<local id>` token per contact, space separated, in the given order.
pub fn mention_all(contacts: &[Contact]) -> String {
    contacts
        .iter()
        .map(|contact| contact.id.mention())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fill the welcome template's `{mention}` and `{group}` placeholders.
pub fn welcome_text(template: &str, member: &ContactId, group_name: Option<&str>) -> String {
    template
        .replace("{mention}", &member.mention())
        .replace("{group}", group_name.unwrap_or("the group"))
}
