//! Texts the machine sends. All output is Telegram HTML; user-supplied text is escaped.

use crate::models::order::{Order, Price, ServiceType};
use crate::utils::escape_html;

pub fn welcome() -> String {
    let mut text = String::from(
        "👋 <b>Welcome to DeadlineDesk Bot!</b>\n\nWhich service do you want?\n",
    );
    let digits = ["1️⃣", "2️⃣", "3️⃣", "4️⃣"];
    for (digit, service) in digits.iter().zip(ServiceType::ALL) {
        text.push_str(&format!("\n{} {}", digit, service.menu_label()));
    }
    text.push_str("\n\nReply with the number of the service.");
    text
}

pub fn choose_valid_service() -> String {
    "Please choose a valid option: 1, 2, 3, or 4.".to_string()
}

pub fn ask_deadline() -> String {
    "Got it! Please send the deadline for this task (e.g., 25 Feb 6 PM).".to_string()
}

pub fn empty_reply() -> String {
    "Please send a short text description.".to_string()
}

pub fn text_only() -> String {
    "📎 Files can't be attached to an order. Please type your answer as a text message.".to_string()
}

pub fn start_first() -> String {
    "Send /start to place a new order.".to_string()
}

pub fn under_review(order: &Order) -> String {
    format!(
        "✅ <b>Order Received!</b>\n\n{}\n\nYour order is under review. We will get back to you with a price shortly.",
        order_lines(order)
    )
}

/// Operator-facing summary of an order.
pub fn operator_summary(order: &Order) -> String {
    let who = match &order.client_name {
        Some(name) => format!("{} (<code>{}</code>)", escape_html(name), order.client),
        None => format!("<code>{}</code>", order.client),
    };
    format!(
        "🆕 <b>New order #{}</b>\n\n<b>Client:</b> {}\n{}\n<b>Received:</b> {}",
        order.reference,
        who,
        order_lines(order),
        order.created_at.format("%d %b %Y %H:%M UTC"),
    )
}

fn order_lines(order: &Order) -> String {
    let service = order.service.map(|s| s.name()).unwrap_or("-");
    format!(
        "<b>Service:</b> {}\n<b>Details:</b> {}\n<b>Deadline:</b> {}",
        service,
        escape_html(order.details.as_deref().unwrap_or("-")),
        escape_html(order.deadline.as_deref().unwrap_or("-")),
    )
}

pub fn ask_price(order: &Order) -> String {
    format!(
        "💰 Send the price for order #{} (client <code>{}</code>) as a number.",
        order.reference, order.client
    )
}

pub fn order_rejected() -> String {
    "❌ Sorry, we can't take this order. Send /start to place a new one.".to_string()
}

pub fn price_proposal(order: &Order, price: Price) -> String {
    format!(
        "💰 <b>Price for your order:</b> ₹{}\n\n{}\n\nDo you accept?",
        price,
        order_lines(order)
    )
}

pub fn price_sent(order: &Order, price: Price) -> String {
    format!(
        "📨 Quote of ₹{} sent to client <code>{}</code> for order #{}.",
        price, order.client, order.reference
    )
}

pub fn payment_instructions(price: Price) -> String {
    format!(
        "🧾 Scan the QR code to pay <b>₹{}</b>.\n\nPress <b>Payment Done</b> once you have paid.",
        price
    )
}

pub fn client_accepted_price(order: &Order) -> String {
    format!(
        "👍 Client <code>{}</code> accepted the quote for order #{}. Payment request sent.",
        order.client, order.reference
    )
}

pub fn price_declined_client() -> String {
    "Your order has been cancelled. Send /start whenever you want to order again.".to_string()
}

pub fn price_declined_operator(order: &Order) -> String {
    format!(
        "🚫 Client <code>{}</code> declined the quote for order #{}. The order was removed.",
        order.client, order.reference
    )
}

pub fn ask_screenshot() -> String {
    "📸 Please send a screenshot of your payment.".to_string()
}

pub fn payment_claimed(order: &Order) -> String {
    format!(
        "💸 Client <code>{}</code> reports payment done for order #{}. Waiting for the screenshot.",
        order.client, order.reference
    )
}

pub fn screenshot_received() -> String {
    "🔎 Screenshot received. We'll verify your payment shortly.".to_string()
}

pub fn screenshot_caption(order: &Order) -> String {
    let amount = order.price.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
    format!(
        "🧾 Payment screenshot for order #{} from client <code>{}</code> (₹{}).",
        order.reference, order.client, amount
    )
}

pub fn resend_screenshot() -> String {
    "⚠️ We couldn't verify your payment. Please check it, press <b>Payment Done</b> and send the screenshot again.".to_string()
}

pub fn payment_rejected_operator(order: &Order) -> String {
    format!(
        "↩️ Asked client <code>{}</code> to resend the payment screenshot for order #{}.",
        order.client, order.reference
    )
}

pub fn full_delivery_caption() -> String {
    "🎉 Payment verified! Here is your completed work. Thank you for using DeadlineDesk.".to_string()
}

pub fn delivered(order: &Order) -> String {
    format!(
        "✅ Order #{} delivered to client <code>{}</code> and closed.",
        order.reference, order.client
    )
}

pub fn partial_delivery_caption() -> String {
    "👀 Here is a preview of your work. The full file follows once your payment is verified.".to_string()
}

pub fn partial_sent(order: &Order) -> String {
    format!(
        "📤 Preview sent to client <code>{}</code> for order #{}.",
        order.client, order.reference
    )
}

pub fn partial_held(order: &Order) -> String {
    format!(
        "🗂 Preview stored for order #{} ({}). It will be sent when the client reaches payment.",
        order.reference, order.state
    )
}

pub fn full_ready_client() -> String {
    "📦 Your completed work is ready. It will be delivered as soon as your payment is verified.".to_string()
}

pub fn full_held(order: &Order) -> String {
    format!(
        "🗂 Full deliverable stored for order #{} ({}). It will be sent on approval.",
        order.reference, order.state
    )
}

pub fn order_discarded(order: &Order) -> String {
    format!(
        "🔄 Client <code>{}</code> started over; order #{} ({}) was discarded.",
        order.client, order.reference, order.state
    )
}
