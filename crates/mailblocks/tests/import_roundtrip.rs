/*
 * import_roundtrip.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Importer behavior on hand-written legacy modules, and generate/parse
 * round trips.
 */

use mailblocks::block::{
    ButtonBlock, GreetingBlock, HeadingBlock, ImageBlock, LinkBlock, ListBlock, ParagraphBlock,
    SpacerBlock,
};
use mailblocks::{
    Block, BlockId, ColorScheme, Footer, FooterKind, Header, Template, VariableDeclaration,
    VariableKind, generate, parse,
};
use pretty_assertions::assert_eq;
use std::path::Path;

fn fixture_path(name: &str) -> std::path::PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join("test-fixtures").join(name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to read fixture: {}", name))
}

fn codes(diagnostics: &[mailblocks_diagnostics::DiagnosticMessage]) -> Vec<&str> {
    diagnostics
        .iter()
        .map(|d| d.code.as_deref().unwrap_or(""))
        .collect()
}

#[test]
fn test_missing_subject_fixture() {
    let result = parse(&read_fixture("missing-subject.ts"));
    assert!(result.template.is_none());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].title, "Missing subject");
    assert_eq!(codes(&result.errors), vec!["M-4-1"]);
}

#[test]
fn test_service_reminder_fixture() {
    let result = parse(&read_fixture("service-reminder.ts"));
    assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
    let template = result.template.expect("template");

    assert_eq!(template.slug, "service-reminder");
    assert_eq!(
        template.description.as_deref(),
        Some("Reminds the customer of tomorrow's visit")
    );
    assert_eq!(template.color_scheme, ColorScheme::Orange);
    assert_eq!(
        template.subject,
        "Reminder: {{service_name}} tomorrow at {{service_time}}"
    );
    assert_eq!(template.preheader.as_deref(), Some("We'll see you soon"));
    assert_eq!(
        template.header,
        Header::new("See you tomorrow!")
            .with_emoji("🧹")
            .with_subtitle("Your {{service_name}} visit")
    );
    assert_eq!(template.footer, Footer::new(FooterKind::Minimal));

    let ids: Vec<&str> = template.blocks.iter().map(|b| b.id().as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "greeting-1",
            "paragraph-2",
            "heading-3",
            "list-4",
            "button-5",
            "divider-6",
            "image-7"
        ]
    );

    assert_eq!(
        template.blocks[0],
        Block::Greeting(GreetingBlock {
            id: BlockId::new("greeting-1"),
            name_variable: "{{customer_name}}".to_string(),
        })
    );
    assert_eq!(
        template.blocks[2],
        Block::Heading(HeadingBlock {
            id: BlockId::new("heading-3"),
            text: "Before we arrive".to_string(),
            level: 2,
        })
    );
    assert_eq!(
        template.blocks[3],
        Block::List(ListBlock {
            id: BlockId::new("list-4"),
            items: vec![
                "Clear access to the work area".to_string(),
                "Secure any pets".to_string()
            ],
            ordered: false,
        })
    );
    // bgcolor matches the template's own scheme, so no override
    assert_eq!(
        template.blocks[4],
        Block::Button(ButtonBlock {
            id: BlockId::new("button-5"),
            label: "Reschedule".to_string(),
            url_variable: "reschedule_url".to_string(),
            color_scheme: None,
        })
    );
    assert_eq!(
        template.blocks[6],
        Block::Image(ImageBlock {
            id: BlockId::new("image-7"),
            content_id: "company_logo".to_string(),
            alt: "Sparkle & Shine".to_string(),
            width: Some(120),
        })
    );

    match &template.blocks[1] {
        Block::Paragraph(p) => {
            assert!(p.text.starts_with("Just a reminder that your <strong>{{service_name}}</strong>"));
            assert!(p.text.contains("${formatDate(data.service_date)}"));
            assert!(p.text.ends_with("at {{service_time}}."));
        }
        other => panic!("expected paragraph, got {:?}", other),
    }

    // the skipped table is the only place technician_name appears
    let declared: Vec<&str> = template.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(
        declared,
        vec![
            "customer_name",
            "service_name",
            "service_date",
            "service_time",
            "reschedule_url"
        ]
    );
    assert_eq!(template.variables[2].kind, VariableKind::Date);
    assert_eq!(template.variables[4].kind, VariableKind::Url);

    assert_eq!(codes(&result.warnings), vec!["M-4-4", "M-4-4"]);
    assert_eq!(result.warnings[0].title, "Unsupported expression");
    assert_eq!(result.warnings[1].title, "Unrecognized content skipped");
    assert!(result.warnings.iter().all(|w| w.location.is_some()));
}

#[test]
fn test_generated_module_round_trips() {
    let original = Template::new(
        "booking-confirmation",
        "Booking Confirmation",
        "You're booked: {{service_name}} on {{service_date}}",
        Header::new("You're booked!")
            .with_emoji("📅")
            .with_subtitle("{{service_name}} with us"),
    )
    .with_color_scheme(ColorScheme::Green)
    .with_preheader("See you at {{service_time}}")
    .with_blocks(vec![
        Block::Greeting(GreetingBlock {
            id: BlockId::new("hello"),
            name_variable: "{{customer_name}}".to_string(),
        }),
        Block::Paragraph(ParagraphBlock {
            id: BlockId::new("intro"),
            text: "Your <strong>{{service_name}}</strong> costs $40 and starts at `9`.".to_string(),
        }),
        Block::Heading(HeadingBlock {
            id: BlockId::new("what-next"),
            text: "What happens next".to_string(),
            level: 3,
        }),
        Block::List(ListBlock {
            id: BlockId::new("steps"),
            items: vec!["We confirm by text".to_string(), "We arrive".to_string()],
            ordered: true,
        }),
        Block::Spacer(SpacerBlock {
            id: BlockId::new("gap"),
            height: 24,
        }),
        Block::Button(ButtonBlock {
            id: BlockId::new("reschedule"),
            label: "Reschedule".to_string(),
            url_variable: "reschedule_url".to_string(),
            color_scheme: Some(ColorScheme::Red),
        }),
        Block::divider("rule"),
        Block::Link(LinkBlock {
            id: BlockId::new("portal"),
            text: "Manage bookings".to_string(),
            url_variable: "portal_url".to_string(),
            color_scheme: Some(ColorScheme::Green),
        }),
        Block::Image(ImageBlock {
            id: BlockId::new("qr"),
            content_id: "qr_code".to_string(),
            alt: "Check-in code for \"Main St\"".to_string(),
            width: Some(200),
        }),
    ])
    .with_variables(vec![
        VariableDeclaration::new("customer_name", VariableKind::Text),
        VariableDeclaration::new("service_name", VariableKind::Text),
        VariableDeclaration::new("service_date", VariableKind::Date),
        VariableDeclaration::new("service_time", VariableKind::Text),
        VariableDeclaration::new("reschedule_url", VariableKind::Url),
        VariableDeclaration::new("portal_url", VariableKind::Url).optional(),
    ]);
    let mut original = original;
    original.description = Some("Sent when a visit is booked".to_string());
    original.context = Some("booking-confirmation".to_string());
    original.footer = Footer {
        kind: FooterKind::Minimal,
        note: Some("Questions? Reply to this email.".to_string()),
    };

    let source = generate(&original).unwrap();
    assert!(source.contains("<!-- block: portal scheme: green -->\n"));
    assert!(source.contains("<!-- block: reschedule -->\n"));
    let result = parse(&source);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.template, Some(original));
}

#[test]
fn test_unsupported_blocks_are_dropped_on_round_trip() {
    let json = read_fixture("payment-reminder.json");
    let original = Template::from_json(&json).unwrap();

    let result = parse(&generate(&original).unwrap());
    assert!(result.is_ok(), "{:?}", result.errors);
    assert_eq!(codes(&result.warnings), vec!["M-4-4"]);
    assert_eq!(result.warnings[0].title, "Unrecognized content skipped");

    let mut expected = original.clone();
    expected.remove_block("summary").unwrap();
    assert_eq!(result.template, Some(expected));
}

#[test]
fn test_generated_source_uses_interpolations() {
    let json = read_fixture("payment-reminder.json");
    let template = Template::from_json(&json).unwrap();
    let source = generate(&template).unwrap();

    assert!(source.contains("export interface PaymentReminderVariables {"));
    assert!(source.contains("  portal_url?: string; // url\n"));
    assert!(source.contains("<!-- block: pay -->"));
    assert!(source.contains("href=\"${data.pay_url}\""));
    assert!(!source.contains("{{due_date}}</strong>"));
}
