//! # Notification Templates
//!
//! Fixed mail bodies for purchases, reservations, completed payments and
//! the contact form. Each customer-facing mail has an admin-facing twin
//! with the same fields and different framing.

use crate::format::{escape_html, format_date, mask_card_number};
use shop_core::{
    ContactMessage, Email, OrderRequest, PaymentMethod, ProductSnapshot, ReservationRequest, Yen,
};

pub const PURCHASE_CONFIRMATION_SUBJECT: &str = "【購入確認】ご注文ありがとうございます";
pub const PURCHASE_NOTICE_SUBJECT: &str = "【新規購入】新しい注文がありました";
pub const RESERVATION_CONFIRMATION_SUBJECT: &str = "【予約確認】ご予約ありがとうございます";
pub const RESERVATION_NOTICE_SUBJECT: &str = "【新規予約】新しい予約がありました";
pub const PAYMENT_COMPLETED_SUBJECT: &str = "【購入完了】ご注文ありがとうございます";

/// Small builder so every template escapes user text the same way
struct HtmlBody(String);

impl HtmlBody {
    fn new() -> Self {
        HtmlBody(String::new())
    }

    fn heading(mut self, text: &str) -> Self {
        self.0.push_str(&format!("<h2>{}</h2>\n", escape_html(text)));
        self
    }

    fn section(mut self, text: &str) -> Self {
        self.0.push_str(&format!("<h3>{}</h3>\n", escape_html(text)));
        self
    }

    fn para(mut self, text: &str) -> Self {
        self.0.push_str(&format!("<p>{}</p>\n", escape_html(text)));
        self
    }

    fn paras<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines.into_iter().fold(self, |body, line| body.para(line.as_ref()))
    }

    /// One paragraph with line breaks between the lines
    fn block(mut self, lines: &[String]) -> Self {
        let joined = lines
            .iter()
            .map(|l| escape_html(l))
            .collect::<Vec<_>>()
            .join("<br>\n");
        self.0.push_str(&format!("<p>{}</p>\n", joined));
        self
    }

    fn finish(self) -> String {
        self.0
    }
}

/// Payment method summary; empty for an unspecified method
pub fn payment_info_lines(payment: &PaymentMethod) -> Vec<String> {
    match payment {
        PaymentMethod::Credit(card) => vec![
            "お支払い方法: クレジットカード".to_string(),
            format!("カード番号: {}", mask_card_number(&card.card_number)),
            format!("カード名義人: {}", card.card_name),
            format!("有効期限: {}", card.card_expiry),
        ],
        PaymentMethod::Bank(bank) => vec![
            "お支払い方法: 銀行振込".to_string(),
            format!("銀行名: {}", bank.bank_name),
            format!("口座名義: {}", bank.account_holder),
            format!("口座番号: {}", bank.account_number),
        ],
        PaymentMethod::CashOnDelivery => vec!["お支払い方法: 代金引換".to_string()],
        PaymentMethod::Unspecified => Vec::new(),
    }
}

pub fn payment_info(payment: &PaymentMethod) -> String {
    payment_info_lines(payment).join("\n")
}

fn product_lines(product: &ProductSnapshot) -> Vec<String> {
    vec![
        format!("商品名: {} ({})", product.name, product.product_type),
        format!("価格: {}", product.price),
        format!("サイズ: {}", product.size),
    ]
}

fn shipping_lines(order: &OrderRequest) -> Vec<String> {
    vec![
        format!("〒{}", order.postal_code),
        format!("{} {}", order.city, order.address),
        format!("TEL: {}", order.phone),
    ]
}

fn customer_lines(order: &OrderRequest) -> Vec<String> {
    vec![
        format!("お名前: {}", order.name),
        format!("メールアドレス: {}", order.email),
        format!("電話番号: {}", order.phone),
        format!("郵便番号: {}", order.postal_code),
        format!("住所: {} {}", order.city, order.address),
    ]
}

/// Confirmation sent to the customer after the order form is submitted
pub fn purchase_confirmation(order: &OrderRequest) -> Email {
    let html = HtmlBody::new()
        .heading("ご購入ありがとうございます")
        .para(&format!("{} 様", order.name))
        .para("ご注文いただいた商品は、ご登録いただいた住所へお届けいたします。")
        .section("商品情報")
        .paras(product_lines(&order.product))
        .section("お届け先情報")
        .paras(shipping_lines(order))
        .section("お支払い情報")
        .block(&payment_info_lines(&order.payment))
        .para("ご購入ありがとうございました。")
        .finish();

    Email::html(&order.email, PURCHASE_CONFIRMATION_SUBJECT, html)
}

/// Notice sent to the shop for a submitted order
pub fn purchase_notice(order: &OrderRequest, admin_email: &str) -> Email {
    let html = HtmlBody::new()
        .heading("新規購入通知")
        .para("新しい注文がありました。")
        .section("お客様情報")
        .paras(customer_lines(order))
        .section("商品情報")
        .paras(product_lines(&order.product))
        .section("お支払い情報")
        .block(&payment_info_lines(&order.payment))
        .finish();

    Email::html(admin_email, PURCHASE_NOTICE_SUBJECT, html)
}

fn reservation_lines(reservation: &ReservationRequest) -> Vec<String> {
    vec![
        format!("予約日時: {}", format_date(&reservation.date)),
        format!("予約タイプ: {}", reservation.kind_label()),
    ]
}

fn with_reserved_product(body: HtmlBody, reservation: &ReservationRequest) -> HtmlBody {
    match &reservation.product {
        Some(product) => body.section("商品情報").paras(product_lines(product)),
        None => body,
    }
}

/// Confirmation sent to the customer for a lesson or product reservation
pub fn reservation_confirmation(reservation: &ReservationRequest) -> Email {
    let body = HtmlBody::new()
        .heading("ご予約ありがとうございます")
        .para(&format!("{} 様", reservation.name))
        .para("ご予約いただいた内容は以下の通りです。")
        .section("予約情報")
        .paras(reservation_lines(reservation));

    let html = with_reserved_product(body, reservation)
        .para("ご予約ありがとうございました。")
        .finish();

    Email::html(&reservation.email, RESERVATION_CONFIRMATION_SUBJECT, html)
}

/// Notice sent to the shop for a reservation
pub fn reservation_notice(reservation: &ReservationRequest, admin_email: &str) -> Email {
    let body = HtmlBody::new()
        .heading("新規予約通知")
        .para("新しい予約がありました。")
        .section("お客様情報")
        .paras([
            format!("お名前: {}", reservation.name),
            format!("メールアドレス: {}", reservation.email),
            format!("電話番号: {}", reservation.phone),
        ])
        .section("予約情報")
        .paras(reservation_lines(reservation));

    Email::html(
        admin_email,
        RESERVATION_NOTICE_SUBJECT,
        with_reserved_product(body, reservation).finish(),
    )
}

fn paid_product_lines(order: &OrderRequest, amount_total: Yen) -> Vec<String> {
    vec![
        format!("商品名: {} ({})", order.product.name, order.product.product_type),
        format!("サイズ: {}", order.product.size),
        format!("お支払い金額: {}", amount_total),
    ]
}

/// Receipt sent to the customer once the hosted checkout is paid
pub fn payment_completed_confirmation(order: &OrderRequest, amount_total: Yen) -> Email {
    let html = HtmlBody::new()
        .heading("ご購入ありがとうございます")
        .para(&format!("{} 様", order.name))
        .para("ご注文いただいた商品は、ご登録いただいた住所へお届けいたします。")
        .section("商品情報")
        .paras(paid_product_lines(order, amount_total))
        .section("お届け先情報")
        .paras(shipping_lines(order))
        .para("ご購入ありがとうございました。")
        .finish();

    Email::html(&order.email, PAYMENT_COMPLETED_SUBJECT, html)
}

/// Notice sent to the shop once the hosted checkout is paid
pub fn payment_completed_notice(
    order: &OrderRequest,
    amount_total: Yen,
    payment_id: &str,
    admin_email: &str,
) -> Email {
    let html = HtmlBody::new()
        .heading("新規購入通知")
        .para("新しい注文がありました。")
        .section("お客様情報")
        .paras(customer_lines(order))
        .section("商品情報")
        .paras(paid_product_lines(order, amount_total))
        .section("決済情報")
        .para(&format!("決済ID: {}", payment_id))
        .para("決済方法: クレジットカード")
        .finish();

    Email::html(admin_email, PURCHASE_NOTICE_SUBJECT, html)
}

/// Contact form message delivered to the shop; replies go to the sender
pub fn contact_message(message: &ContactMessage, receiver_email: &str) -> Email {
    Email::text(receiver_email, &message.name, &message.message).with_reply_to(&message.email)
}

/// Copy of the contact form message for the sender
pub fn contact_copy(message: &ContactMessage) -> Email {
    Email::text(&message.email, &message.name, &message.message)
}
