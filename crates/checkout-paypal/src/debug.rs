//! Human-readable summaries of PayPal responses, for debug logging.

use checkout_core::{ApiResponse, LinkDescription, OrderResource, PaymentResource};
use std::fmt::Write;

fn write_links(out: &mut String, title: &str, links: &[LinkDescription]) {
    let _ = writeln!(out, "{}:", title);
    for link in links {
        let _ = writeln!(out, "\t{}: {}\tCall Type: {}", link.rel, link.href, link.method);
    }
}

fn order_header(response: &ApiResponse<OrderResource>) -> String {
    let order = &response.result;
    let mut out = String::new();
    let _ = writeln!(out, "Status Code: {}", response.status_code);
    let _ = writeln!(out, "Status: {}", order.status);
    let _ = writeln!(out, "Order ID: {}", order.id);
    if let Some(intent) = &order.intent {
        let _ = writeln!(out, "Intent: {}", intent);
    }
    out
}

/// Summary of a created or fetched order
pub fn describe_order(response: &ApiResponse<OrderResource>) -> String {
    let mut out = order_header(response);
    write_links(&mut out, "Links", &response.result.links);
    out
}

/// Order summary plus the ids of the captures it produced
pub fn describe_capture_order(response: &ApiResponse<OrderResource>) -> String {
    let mut out = describe_order(response);
    let _ = writeln!(out, "Capture Ids:");
    for id in response.result.capture_ids() {
        let _ = writeln!(out, "\t{}", id);
    }
    out
}

/// Order summary plus the authorization it produced
pub fn describe_authorize_order(response: &ApiResponse<OrderResource>) -> String {
    let mut out = order_header(response);
    if let Some(authorization) = response.result.first_authorization() {
        let _ = writeln!(out, "Authorization ID: {}", authorization.id);
    }
    write_links(&mut out, "Links", &response.result.links);
    if let Some(authorization) = response.result.first_authorization() {
        write_links(&mut out, "Authorization Links", &authorization.links);
    }
    out
}

/// Summary of a capture, authorization or refund (`label` names the kind)
pub fn describe_payment(label: &str, response: &ApiResponse<PaymentResource>) -> String {
    let payment = &response.result;
    let mut out = String::new();
    let _ = writeln!(out, "Status Code: {}", response.status_code);
    let _ = writeln!(out, "Status: {}", payment.status);
    let _ = writeln!(out, "{} ID: {}", label, payment.id);
    if let Some(amount) = &payment.amount {
        let _ = writeln!(out, "Amount: {} {}", amount.currency_code, amount.value);
    }
    write_links(&mut out, "Links", &payment.links);
    out
}
