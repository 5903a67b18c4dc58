use super::*;

/// Show the QR code to pay for an order.
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    custom_data = "CmdMeta { perms: PermissionLevel::Staff }"
)]
pub async fn pay(
    ctx: Ctx<'_>,
    #[description = "Amount to pay, in millions"] amount: Option<f64>,
) -> Res<()> {
    let config = ctx.get_config();
    let qr_code = util::qr_code_url(&config.payment_address)?;

    ctx.reply_embed_builder(|e| {
        e.title("💸 Payment")
            .description(format!(
                "Scan the QR code or pay to `{}`.\nPost a screenshot of the payment here once you're done.",
                config.payment_address
            ))
            .field_opt("Amount", amount.map(|x| format!("{x}M")), true)
            .image(qr_code.to_string())
    })
    .await?;
    Ok(())
}
