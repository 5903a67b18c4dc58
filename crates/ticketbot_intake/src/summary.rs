use crate::{
    directory::Member,
    order::{format_catalog_name, format_price, format_yes_no, ValidatedOrder, PLACEHOLDER},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Platform-neutral description of an order, turned into an embed by the discord layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub title: String,
    pub description: String,
    /// Identity that should be pinged alongside the message.
    pub mention: Option<String>,
    pub thumbnail: Option<String>,
    pub color: u32,
    pub fields: Vec<SummaryField>,
}

pub const COLOR_ORDER_LOG: u32 = 0x9b59b6;
pub const COLOR_TICKET: u32 = 0x2ecc71;

impl OrderSummary {
    /// Summary posted to the staff order log.
    pub fn order_log(order: &ValidatedOrder, member: &Member) -> Self {
        OrderSummary {
            title: format!("📦 New order - {}", order.order_type.to_string().to_uppercase()),
            description: format!("Order from **{}**", member.display_name),
            mention: None,
            thumbnail: member.avatar_url.clone(),
            color: COLOR_ORDER_LOG,
            fields: order_fields(order),
        }
    }

    /// Summary posted into the freshly created ticket channel.
    pub fn ticket_welcome(order: &ValidatedOrder, member: &Member) -> Self {
        let mut fields = vec![SummaryField {
            name: "🛠️ Service".to_string(),
            value: order.order_type.to_string(),
            inline: false,
        }];
        fields.extend(order_fields(order));
        OrderSummary {
            title: "🎫 Order registered".to_string(),
            description: "Your order has been registered!\nOur staff will get in touch with you shortly."
                .to_string(),
            mention: Some(member.id.clone()),
            thumbnail: member.avatar_url.clone(),
            color: COLOR_TICKET,
            fields,
        }
    }
}

fn field(name: &str, value: impl Into<String>, inline: bool) -> SummaryField {
    SummaryField { name: name.to_string(), value: value.into(), inline }
}

fn order_fields(order: &ValidatedOrder) -> Vec<SummaryField> {
    let form = &order.form_data;
    let blowpipe = if form.has_blowpipe {
        format!("Yes ({})", format_catalog_name(form.blowpipe_dart.as_deref()))
    } else {
        format_yes_no(false).to_string()
    };
    let stats = form.stats.as_ref().map_or_else(|| PLACEHOLDER.to_string(), |x| x.to_lines());

    let mut fields = vec![
        field("🔪 Melee", format_catalog_name(form.melee_weapon.as_deref()), true),
        field("🏹 Bow", format_catalog_name(form.bow.as_deref()), true),
        field("💎 Amulet", format_catalog_name(form.amulet.as_deref()), true),
        field("📊 Stats", stats, false),
        field("📡 Parsec", format_yes_no(form.use_parsec), true),
        field("🙏 CoX Prayers", format_yes_no(form.cox_prayers), true),
        field("🏹 Blowpipe", blowpipe, true),
        field("💸 Price", format_price(order.price), true),
    ];
    if let Some(description) = form.description.as_deref().filter(|x| !x.trim().is_empty()) {
        fields.push(field("📝 Description", description, false));
    }
    fields
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::order::{FormData, OrderType};

    fn member() -> Member {
        Member { id: "U1".into(), display_name: "zuk".into(), avatar_url: None }
    }

    fn field_value<'a>(summary: &'a OrderSummary, name: &str) -> &'a str {
        &summary.fields.iter().find(|x| x.name == name).unwrap().value
    }

    #[test]
    fn test_missing_form_fields_render_placeholder() {
        let order = ValidatedOrder {
            requester_id: "U1".into(),
            order_type: OrderType::Inferno,
            form_data: FormData::default(),
            price: None,
        };
        let summary = OrderSummary::order_log(&order, &member());
        assert_eq!(summary.title, "📦 New order - INFERNO");
        assert_eq!(field_value(&summary, "🔪 Melee"), "None");
        assert_eq!(field_value(&summary, "📊 Stats"), "None");
        assert_eq!(field_value(&summary, "🏹 Blowpipe"), "No");
        assert_eq!(field_value(&summary, "💸 Price"), "None");
        assert!(summary.fields.iter().all(|x| x.name != "📝 Description"));
    }

    #[test]
    fn test_ticket_welcome_mentions_requester() {
        let order = ValidatedOrder {
            requester_id: "U1".into(),
            order_type: OrderType::Quiver,
            form_data: FormData {
                bow: Some("twisted_bow".into()),
                has_blowpipe: true,
                blowpipe_dart: Some("dragon_dart".into()),
                ..Default::default()
            },
            price: Some(500.0),
        };
        let summary = OrderSummary::ticket_welcome(&order, &member());
        assert_eq!(summary.mention.as_deref(), Some("U1"));
        assert_eq!(summary.fields[0].value, "Quiver");
        assert_eq!(field_value(&summary, "🏹 Bow"), "Twisted Bow");
        assert_eq!(field_value(&summary, "🏹 Blowpipe"), "Yes (Dragon Dart)");
        assert_eq!(field_value(&summary, "💸 Price"), "500M");
    }
}
