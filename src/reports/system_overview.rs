//! System overview and next steps, prepared for the venue owner on 18 February 2026.

use genpdf::style::Color;

use super::Theme;
use crate::assemble::{
    Closing, ContentPlan, FactLook, FactTable, ListMarker, PlanItem, PlanSection, Step, StepLook,
    TitleBlock,
};
use crate::model::{CellPadding, ColumnWidth, HorizontalAlignment, TableRules, VerticalAlignment};
use crate::style::{pt, PageSetup, Stroke, StyleRole, StyleSheet, TextStyle};

const COPPER: Color = Color::Rgb(0xC0, 0x7A, 0x50);
const DARK: Color = Color::Rgb(0x1A, 0x1A, 0x2E);
const GRAY: Color = Color::Rgb(0x6B, 0x72, 0x80);
const LIGHT_GRAY: Color = Color::Rgb(0x9C, 0xA3, 0xAF);
const WHITE: Color = Color::Rgb(0xFF, 0xFF, 0xFF);
const BORDER: Color = Color::Rgb(0xE5, 0xE7, 0xEB);
const TABLE_HEADER_BG: Color = Color::Rgb(0xE8, 0xD5, 0xB7);
const TABLE_ROW_BG: Color = Color::Rgb(0xFA, 0xFA, 0xFA);
const GREEN: Color = Color::Rgb(0x05, 0x96, 0x69);
const CRED_BG: Color = Color::Rgb(0xFE, 0xF9, 0xF0);

const DATE: &str = "18 February 2026";

pub(super) fn theme() -> Theme {
    let body = TextStyle::new(10, DARK)
        .with_line_spacing(1.2)
        .with_space_after(pt(4.0));

    let stylesheet = StyleSheet::new(body)
        .with(
            StyleRole::Title,
            TextStyle::new(26, DARK).bold().with_space_after(pt(1.0)),
        )
        .with(StyleRole::Subtitle, TextStyle::new(11, GRAY))
        .with(
            StyleRole::Meta,
            TextStyle::new(8, LIGHT_GRAY).with_space_before(pt(12.0)),
        )
        .with(
            StyleRole::Heading,
            TextStyle::new(14, COPPER)
                .bold()
                .with_space_before(pt(14.0))
                .with_space_after(pt(6.0)),
        )
        .with(
            StyleRole::ListItem,
            body.with_indent(pt(16.0)).with_space_after(pt(3.0)),
        )
        .with(
            StyleRole::Note,
            TextStyle::new(8, GRAY).italic().with_space_after(pt(4.0)),
        )
        .with(StyleRole::Accent, TextStyle::new(8, COPPER))
        .with(StyleRole::Small, TextStyle::new(8, GRAY))
        .with(
            StyleRole::Footer,
            TextStyle::new(8, LIGHT_GRAY).with_alignment(HorizontalAlignment::Center),
        )
        .with(StyleRole::TableHeader, TextStyle::new(10, DARK).bold())
        .with(StyleRole::TableCell, TextStyle::new(10, DARK))
        .with(StyleRole::CellNote, TextStyle::new(8, GRAY));

    Theme {
        stylesheet,
        page_setup: PageSetup::a4(20.0, 23.0, 15.0, 23.0),
    }
}

fn separators(include_last: bool) -> TableRules {
    TableRules::RowSeparators {
        stroke: Stroke::new(0.5, BORDER),
        include_last,
    }
}

fn header_look(vertical: VerticalAlignment, band_fill: Option<Color>) -> FactLook {
    FactLook {
        header_fill: Some(TABLE_HEADER_BG),
        key_fill: None,
        value_fill: None,
        band_fill,
        bold_keys: true,
        rules: separators(true),
        padding: CellPadding::new(5.0, 8.0, 5.0, 8.0),
        vertical,
    }
}

fn action_look() -> StepLook {
    StepLook {
        badge_width: ColumnWidth::Fraction(0.07),
        body_width: ColumnWidth::Fraction(0.89),
        badge_fill: Some(COPPER),
        body_fill: None,
        number_color: WHITE,
        number_size: 11,
        badge_padding: CellPadding::new(6.0, 0.0, 6.0, 0.0),
        body_padding: CellPadding::new(6.0, 6.0, 6.0, 10.0),
        badge_vertical: VerticalAlignment::Middle,
        body_vertical: VerticalAlignment::Top,
        rules: separators(true),
        gap_after: 0.0,
    }
}

pub(super) fn plan() -> ContentPlan {
    let overview = FactTable::new(
        0.30,
        0.70,
        header_look(VerticalAlignment::Middle, Some(TABLE_ROW_BG)),
    )
    .with_header("Overall Status", "Detail")
    .with_row("Core Features", "All implemented and tested in test mode")
    .with_row(
        "Payment Processing",
        "Fully working via Stripe (platform-direct model)",
    )
    .with_row("Money Flow", "100% stays on TipUs platform until payout")
    .with_row("Payout Safety", "Per-employee tracking prevents double-payments")
    .with_row("Current Mode", "Test mode (ready for live switch)");

    let roles = FactTable::new(0.25, 0.75, header_look(VerticalAlignment::Top, None))
        .with_header("Role", "Responsibilities")
        .with_row(
            "Admin (TipUs)",
            "Manages all venues, creates QR codes, triggers and monitors payouts, full platform \
             oversight",
        )
        .with_row(
            "Venue Owner",
            "Registers venue, invites/manages employees, sets payout frequency, views tip & \
             payout history (read-only)",
        )
        .with_row(
            "Employee",
            "Accepts invite, enters bank details, views personal tips & payout history, updates \
             profile",
        );

    let credentials = FactTable::new(
        0.23,
        0.77,
        FactLook {
            header_fill: None,
            key_fill: Some(CRED_BG),
            value_fill: Some(CRED_BG),
            band_fill: None,
            bold_keys: true,
            rules: separators(false),
            padding: CellPadding::new(6.0, 8.0, 6.0, 8.0),
            vertical: VerticalAlignment::Middle,
        },
    )
    .with_row("Tipper Card", "4242 4242 4242 4242  (any expiry, any CVC)")
    .with_row(
        "Employee Bank",
        "BSB: 110000  |  Account: 000123456  |  Name: any name",
    );

    let features = [
        ("Real-time notifications", "for tips, QR code creation, and payout status"),
        ("Guided onboarding tutorial", "for new venue owners and employees"),
        ("Prorated payout calculations", "when employees join or leave mid-period"),
        ("Per-employee payout tracking", "with visibility into failures and reasons"),
        ("5% platform fee", "automatically deducted before distribution"),
        ("Employee invite system", "via email with secure setup flow"),
        ("Mobile responsive", "full mobile experience with bottom navigation"),
    ];

    let actions = vec![
        Step::new(
            "Domain Name",
            "Purchase a domain (e.g. tipus.com.au or tipusaus.com) via GoDaddy or similar. A \
             custom domain is **required before Stripe can go live**.",
        ),
        Step::new(
            "Hosting Decision",
            "The app is deployed on Netlify under our account. You can either: (a) continue with \
             us hosting it, or (b) create your own Netlify account and we transfer the project.",
        ),
        Step::new(
            "Email Service",
            "We currently use our own Resend API keys for employee invitation emails. Supabase’s \
             built-in email (2–30 msgs/hour) is not suitable for production. You’ll need your \
             own **Resend account** (free: 100 emails/day) or we can continue using ours.",
        ),
        Step::new(
            "Stripe Live Mode",
            "Once the domain is active, enable live mode on your Stripe account. Requires: \
             verified business identity (already started), custom domain, and a real bank \
             account for payouts.",
        ),
        Step::new(
            "Live Environment Testing",
            "After Stripe goes live, we test the full flow with real cards and real bank \
             accounts to verify payments, tip recording, and automatic payouts in production.",
        ),
    ];

    let sections = vec![
        PlanSection::new(
            "1. System Overview",
            vec![
                PlanItem::text(
                    StyleRole::Body,
                    "**TipUs** is a digital tipping platform designed for Australian hospitality \
                     venues. Customers scan a QR code at a venue, select a tip amount, and pay \
                     instantly with their card or digital wallet (Apple Pay / Google Pay).",
                ),
                PlanItem::text(
                    StyleRole::Body,
                    "All tip money stays on the TipUs platform. Venues never touch money or Stripe \
                     directly. At payout time, TipUs keeps a 5% platform fee and distributes 95% to \
                     employees, prorated by their active days in the period. Money goes directly to \
                     each employee’s Australian bank account via Stripe.",
                ),
                PlanItem::Spacer(pt(4.0)),
                PlanItem::Facts(overview),
                PlanItem::Spacer(pt(2.0)),
                PlanItem::text(StyleRole::Accent, "Live test URL:  **tipusaus.netlify.app**"),
            ],
        ),
        PlanSection::new("2. User Roles", vec![PlanItem::Facts(roles)]),
        PlanSection::new(
            "3. Key Features",
            vec![
                PlanItem::checklist(
                    ListMarker::new("✓", GREEN),
                    features
                        .iter()
                        .map(|(title, description)| format!("**{}** — {}", title, description)),
                ),
                PlanItem::Spacer(pt(2.0)),
                PlanItem::text(
                    StyleRole::Small,
                    "**Tech Stack:**  React + TypeScript  |  Supabase (database, auth, edge \
                     functions)  |  Stripe (payments & transfers)  |  Netlify (hosting)  |  \
                     Resend (email)",
                ),
            ],
        ),
        PlanSection::new(
            "4. Action Items for Gonzalo",
            vec![
                PlanItem::text(
                    StyleRole::Body,
                    "The platform is fully functional in **test mode**. To go live with real \
                     money, the following items need to be completed:",
                ),
                PlanItem::Steps {
                    look: action_look(),
                    steps: actions,
                },
            ],
        ),
        PlanSection::new(
            "5. Test Credentials (Current Test Mode)",
            vec![
                PlanItem::Facts(credentials),
                PlanItem::Spacer(pt(8.0)),
                PlanItem::text(
                    StyleRole::Note,
                    "Note: The next testing phase requires real bank details and real bank cards. \
                     Once the domain and hosting are finalised, we will activate Stripe live mode \
                     and begin real-environment testing together.",
                ),
            ],
        ),
    ];

    ContentPlan {
        title_block: TitleBlock {
            lead_space: 0.0,
            title: "TipUs".into(),
            subtitle: "Digital Tipping Platform for Australian Hospitality".into(),
            gap_before_rule: pt(4.0),
            rule: Stroke::new(2.5, COPPER),
            gap_after_rule: 0.0,
            meta: format!(
                "System Overview & Next Steps  |  Prepared for Gonzalo Sauma  |  {}",
                DATE
            ),
            trailing_space: 0.0,
        },
        sections,
        closing: Some(Closing {
            space_before: pt(12.0),
            rule: Stroke::new(0.5, BORDER),
            gap_after_rule: pt(4.0),
            footer: format!(
                "TipUs  |  System Overview & Next Steps  |  Prepared by Mukela Katungu  |  {}",
                DATE
            ),
        }),
    }
}
