//! Client-facing project status report, 17 February 2026.

use genpdf::style::Color;

use super::Theme;
use crate::assemble::{
    Closing, ContentPlan, DetailItem, FactLook, FactTable, ListMarker, PlanItem, PlanSection,
    Step, StepLook, TitleBlock,
};
use crate::model::{CellPadding, ColumnWidth, HorizontalAlignment, TableRules, VerticalAlignment};
use crate::style::{PageSetup, Stroke, StyleRole, StyleSheet, TextStyle};

const CORAL: Color = Color::Rgb(0xd4, 0x85, 0x6a);
const CORAL_LIGHT: Color = Color::Rgb(0xf5, 0xe0, 0xd7);
const CORAL_DARK: Color = Color::Rgb(0xb0, 0x6b, 0x52);
const DARK_TEXT: Color = Color::Rgb(0x1e, 0x29, 0x3b);
const MEDIUM_TEXT: Color = Color::Rgb(0x47, 0x55, 0x69);
const LIGHT_TEXT: Color = Color::Rgb(0x64, 0x74, 0x8b);
const GREEN: Color = Color::Rgb(0x16, 0xa3, 0x4a);
const AMBER: Color = Color::Rgb(0xd9, 0x77, 0x06);
const SURFACE_100: Color = Color::Rgb(0xf1, 0xf5, 0xf9);
const SURFACE_200: Color = Color::Rgb(0xe2, 0xe8, 0xf0);
const WHITE: Color = Color::Rgb(0xff, 0xff, 0xff);

const DATE: &str = "17 February 2026";

fn page_setup() -> PageSetup {
    PageSetup::a4(20.0, 25.0, 20.0, 25.0)
}

pub(super) fn theme() -> Theme {
    let body = TextStyle::new(10, DARK_TEXT)
        .with_line_spacing(1.25)
        .with_space_after(3.0);
    let body_light = TextStyle {
        font_size: 10,
        color: MEDIUM_TEXT,
        ..body
    };

    let stylesheet = StyleSheet::new(body)
        .with(
            StyleRole::Title,
            TextStyle::new(28, CORAL).bold().with_space_after(4.0),
        )
        .with(
            StyleRole::Subtitle,
            TextStyle::new(12, MEDIUM_TEXT).with_space_after(6.0),
        )
        .with(
            StyleRole::Meta,
            TextStyle {
                color: LIGHT_TEXT,
                ..body_light
            },
        )
        .with(
            StyleRole::Heading,
            TextStyle::new(16, CORAL_DARK)
                .bold()
                .with_space_before(8.0)
                .with_space_after(4.0),
        )
        .with(
            StyleRole::Subheading,
            TextStyle::new(12, DARK_TEXT)
                .bold()
                .with_space_before(4.0)
                .with_space_after(2.0),
        )
        .with(StyleRole::BodyMuted, body_light)
        .with(
            StyleRole::ListItem,
            body.with_line_spacing(1.15)
                .with_indent(5.0)
                .with_space_after(2.0),
        )
        .with(StyleRole::DetailTitle, body.with_space_after(1.0))
        .with(
            StyleRole::Detail,
            body_light.with_indent(7.0).with_space_after(4.0),
        )
        .with(
            StyleRole::Footer,
            TextStyle::new(8, LIGHT_TEXT).with_alignment(HorizontalAlignment::Center),
        )
        .with(StyleRole::TableHeader, TextStyle::new(10, WHITE).bold())
        .with(StyleRole::TableCell, TextStyle::new(10, DARK_TEXT))
        .with(StyleRole::CellNote, TextStyle::new(9, MEDIUM_TEXT));

    Theme {
        stylesheet,
        page_setup: page_setup(),
    }
}

fn fact_look(key_fill: Color, header_fill: Option<Color>, left_padding: f64) -> FactLook {
    FactLook {
        header_fill,
        key_fill: Some(key_fill),
        value_fill: Some(SURFACE_100),
        band_fill: None,
        bold_keys: true,
        rules: TableRules::Grid(Stroke::new(0.5, SURFACE_200)),
        padding: CellPadding::new(6.0, 6.0, 6.0, left_padding),
        vertical: VerticalAlignment::Bottom,
    }
}

fn money_flow_look(content_width: f64) -> StepLook {
    StepLook {
        badge_width: ColumnWidth::Fixed(12.0),
        body_width: ColumnWidth::Fixed(content_width - 14.0),
        badge_fill: Some(CORAL),
        body_fill: Some(SURFACE_100),
        number_color: WHITE,
        number_size: 14,
        badge_padding: CellPadding::new(6.0, 6.0, 6.0, 4.0),
        body_padding: CellPadding::new(6.0, 6.0, 6.0, 8.0),
        badge_vertical: VerticalAlignment::Middle,
        body_vertical: VerticalAlignment::Middle,
        rules: TableRules::None,
        gap_after: 2.0,
    }
}

fn next_steps_look(content_width: f64) -> StepLook {
    StepLook {
        badge_width: ColumnWidth::Fixed(10.0),
        body_width: ColumnWidth::Fixed(content_width - 12.0),
        badge_fill: None,
        body_fill: Some(SURFACE_100),
        number_color: CORAL,
        number_size: 10,
        badge_padding: CellPadding::new(4.0, 6.0, 4.0, 6.0),
        body_padding: CellPadding::new(4.0, 6.0, 4.0, 8.0),
        badge_vertical: VerticalAlignment::Top,
        body_vertical: VerticalAlignment::Top,
        rules: TableRules::None,
        gap_after: 1.0,
    }
}

fn steps(look: StepLook, steps: &[(&str, &str)]) -> PlanItem {
    PlanItem::Steps {
        look,
        steps: steps
            .iter()
            .map(|(title, description)| Step::new(*title, *description))
            .collect(),
    }
}

fn named_checklist(marker: ListMarker, items: &[(&str, &str)]) -> PlanItem {
    PlanItem::checklist(
        marker,
        items
            .iter()
            .map(|(name, description)| format!("**{}** — {}", name, description)),
    )
}

pub(super) fn plan() -> ContentPlan {
    let content_width = page_setup().content_width();
    let check = ListMarker::new("✓", GREEN).bold();

    let summary = FactTable::new(0.35, 0.65, fact_look(CORAL_LIGHT, None, 10.0))
        .with_row("Overall Completion", "~98%")
        .with_row("Core Features", "All implemented and tested (10 of 11 phases)")
        .with_row(
            "Payment Processing",
            "Fully working via Stripe (platform-direct model)",
        )
        .with_row("Money Flow", "100% stays on TipUs platform until payout")
        .with_row("Payout Safety", "Per-employee tracking prevents double-payments")
        .with_row("Mode", "Test mode (ready for live switch)");

    let tech = FactTable::new(0.3, 0.7, fact_look(SURFACE_100, Some(CORAL), 8.0))
        .with_header("Component", "Technology")
        .with_row("Frontend", "React 19, TypeScript 5.9, Tailwind CSS 4")
        .with_row("Backend", "Supabase (PostgreSQL, Auth, Edge Functions)")
        .with_row(
            "Payments",
            "Stripe (Platform-Direct + Custom accounts for employees)",
        )
        .with_row("Email", "Resend (transactional email service)")
        .with_row("Hosting", "Netlify (frontend) + Supabase (backend)")
        .with_row(
            "Security",
            "Row-level security, encrypted at rest, role-based access",
        )
        .with_row("Build Size", "~210KB gzipped (production-optimized)");

    let sections = vec![
        PlanSection::new(
            "1. Executive Summary",
            vec![
                PlanItem::text(
                    StyleRole::Body,
                    "**TipUs** is a digital tipping platform designed for Australian hospitality \
                     venues. It allows customers to tip staff by scanning a QR code at a venue, \
                     selecting an amount, and paying instantly with their card or digital wallet \
                     (Apple Pay / Google Pay).",
                ),
                PlanItem::text(
                    StyleRole::Body,
                    "All tip money stays on the TipUs platform. Venues never touch money or Stripe \
                     directly. At payout time, TipUs keeps a 5% platform fee and distributes 95% to \
                     employees, prorated by their active days in the period. Money goes directly to \
                     each employee's Australian bank account via Stripe.",
                ),
                PlanItem::Spacer(2.0),
                PlanItem::Facts(summary),
                PlanItem::Spacer(6.0),
            ],
        ),
        PlanSection::new(
            "2. What's Working",
            vec![
                PlanItem::text(
                    StyleRole::Body,
                    "Every core feature has been built, deployed, and tested end-to-end:",
                ),
                named_checklist(
                    check,
                    &[
                        ("Venue Owner Onboarding", "Sign up, create venue, start receiving tips immediately (no Stripe setup needed)"),
                        ("Employee Management", "Add/edit/deactivate employees, send email invitations"),
                        ("Employee Onboarding", "Employees receive invite, create account, enter bank details"),
                        ("QR Code System", "Generate and manage QR codes per venue or per employee"),
                        ("Customer Tipping", "Scan QR, choose amount, pay with card/Apple Pay/Google Pay"),
                        ("Platform-Direct Payments", "100% of tips stay on TipUs platform, no venue Stripe needed"),
                        ("Tip Recording", "Webhook automatically records each successful payment in the database"),
                        ("Dashboard (Venue Owner)", "Overview stats, tip history with filters, employee management"),
                        ("Dashboard (Employee)", "Personal stats, tip history, payout history, bank detail management"),
                        ("Manual Payouts", "Calculate splits by active days, review, and execute with one click"),
                        ("Automatic Payouts", "Configure weekly/fortnightly/monthly schedule, runs automatically"),
                        ("Bank Transfers", "Employee payouts sent directly to their Australian bank account via Stripe"),
                        ("Payout Safety", "Per-employee tracking: retry only sends to failed employees, never double-pays"),
                        ("Role-Based Access", "Venue owners and employees see different dashboards"),
                        ("Email System", "Invitation emails sent via Resend"),
                        ("Mobile Responsive", "Full mobile experience with bottom navigation"),
                        ("Security", "Row-level security, no secrets in frontend, encrypted data at rest"),
                    ],
                ),
                PlanItem::PageBreak,
            ],
        ),
        PlanSection::new(
            "3. How the Money Flows",
            vec![
                PlanItem::text(
                    StyleRole::Body,
                    "TipUs uses a **platform-direct** model: all tip money stays on the TipUs \
                     Stripe account. Venues never touch money or need to connect Stripe.",
                ),
                PlanItem::Spacer(3.0),
                steps(
                    money_flow_look(content_width),
                    &[
                        (
                            "Customer Scans QR Code",
                            "The customer scans a QR code at the venue with their phone camera.",
                        ),
                        (
                            "Customer Pays",
                            "They choose a tip amount and pay with their card, Apple Pay, or Google Pay.",
                        ),
                        (
                            "Money Stays on TipUs Platform",
                            "100% of the tip lands on the TipUs Stripe account. No money goes to the \
                             venue. The tip is recorded in the database automatically via webhook.",
                        ),
                        (
                            "Venue Owner Distributes",
                            "The venue owner triggers a payout (or it runs on auto-schedule). TipUs \
                             keeps 5% and calculates each employee's share based on days worked.",
                        ),
                        (
                            "Money Reaches Employees",
                            "Each employee's share is transferred to their bank account via Stripe. \
                             Each transfer is tracked individually with status and receipt.",
                        ),
                    ],
                ),
                PlanItem::Spacer(4.0),
            ],
        ),
        PlanSection::new(
            "4. What's New: Payout Safety",
            vec![
                PlanItem::text(
                    StyleRole::Body,
                    "A critical improvement has been made to the payout system to handle partial \
                     failures safely.",
                ),
                PlanItem::Subheading("The Problem (Before)".into()),
                PlanItem::text(
                    StyleRole::Body,
                    "If one employee's bank transfer failed (e.g. incorrect bank details), the \
                     entire payout was marked as \"failed\". Retrying would re-send money to \
                     **all** employees, including those already paid — risking double-payments.",
                ),
                PlanItem::Subheading("The Solution (Now)".into()),
                PlanItem::checklist(
                    check,
                    [
                        "Each employee's transfer is tracked individually (completed, failed, or pending)",
                        "If some transfers succeed and others fail, the payout is marked \"partially completed\"",
                        "Clicking \"Retry Failed\" only processes employees who haven't been paid yet",
                        "Already-paid employees are safely skipped — no risk of double-payments",
                        "Error messages are shown per-employee so you know exactly what went wrong",
                        "Works the same way for both manual and automatic scheduled payouts",
                    ],
                ),
                PlanItem::Spacer(4.0),
            ],
        ),
        PlanSection::new(
            "5. What's Remaining for Production",
            vec![
                PlanItem::text(
                    StyleRole::Body,
                    "The platform is fully functional in **test mode**. To go live with real money:",
                ),
                PlanItem::Spacer(3.0),
                PlanItem::Subheading("Must Complete Before Launch".into()),
                PlanItem::Details {
                    marker: ListMarker::new("●", AMBER).bold(),
                    items: vec![
                        DetailItem::new(
                            "Employee Identity Verification",
                            "Switch from Custom to Express Stripe accounts so Stripe handles \
                             identity verification directly. Currently uses placeholder data for \
                             test mode.",
                        ),
                        DetailItem::new(
                            "Switch to Stripe Live Mode",
                            "Replace test API keys with live keys. Create a new live webhook. \
                             Redeploy all backend functions.",
                        ),
                        DetailItem::new(
                            "Stripe Account Verification",
                            "Verify the Stripe account with real business details: ABN, address, \
                             and connected bank account.",
                        ),
                        DetailItem::new(
                            "Custom Domain + Security",
                            "Set up a production domain (e.g. app.tipus.com.au). Restrict backend \
                             to only accept requests from this domain.",
                        ),
                    ],
                },
                PlanItem::Spacer(2.0),
                PlanItem::Subheading("Nice to Have (After Launch)".into()),
                PlanItem::checklist(
                    ListMarker::new("○", LIGHT_TEXT),
                    [
                        "Analytics dashboard with charts and trends",
                        "Bulk employee invite (add multiple employees at once)",
                        "Email notifications when payouts are processed",
                    ],
                ),
                PlanItem::PageBreak,
            ],
        ),
        PlanSection::new(
            "6. Next Steps",
            vec![
                PlanItem::text(
                    StyleRole::Body,
                    "Here is the recommended order of actions to bring TipUs live:",
                ),
                PlanItem::Spacer(3.0),
                steps(
                    next_steps_look(content_width),
                    &[
                        ("Complete Stripe account setup", "Verify business details, enable Connect, complete platform profile"),
                        ("Switch employees to Express accounts", "Let Stripe handle identity verification (recommended approach)"),
                        ("Register production domain", "Set up app.tipus.com.au or similar, configure SSL"),
                        ("Switch to live Stripe keys", "Update all environment variables and redeploy backend functions"),
                        ("Configure live webhook", "New endpoint in Stripe Dashboard for production"),
                        ("Test with a real payment", "Make a small real tip ($1) and verify the full flow end-to-end"),
                        ("Monitor for 24-48 hours", "Watch Stripe Dashboard and database logs for any issues"),
                        ("Launch", "Share QR codes with venues and start accepting real tips"),
                    ],
                ),
                PlanItem::Spacer(8.0),
            ],
        ),
        PlanSection::new("7. Technical Overview", vec![PlanItem::Facts(tech)]),
    ];

    ContentPlan {
        title_block: TitleBlock {
            lead_space: 15.0,
            title: "TipUs".into(),
            subtitle: "Digital Tipping Platform for Australian Hospitality".into(),
            gap_before_rule: 0.0,
            rule: Stroke::new(2.0, CORAL),
            gap_after_rule: 8.0,
            meta: format!("Project Status Report  |  {}", DATE),
            trailing_space: 8.0,
        },
        sections,
        closing: Some(Closing {
            space_before: 15.0,
            rule: Stroke::new(1.0, SURFACE_200),
            gap_after_rule: 4.0,
            footer: format!("TipUs Status Report  |  {}  |  Confidential", DATE),
        }),
    }
}
