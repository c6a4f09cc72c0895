//! Example: Page Object Model
//!
//! Demonstrates: a page object with fallback locators driving the mock
//! driver through navigation, fill, custom dropdown and assertions
//!
//! Run with: `PAGEWRIGHT_LOG=debug cargo run --example page_object`

use async_trait::async_trait;
use pagewright::mock::{MockDriver, MockElement};
use pagewright::prelude::*;
use std::sync::Arc;
use std::time::Duration;

struct CasesPage {
    heading: Locator,
    search: Locator,
    status: Locator,
}

impl CasesPage {
    fn new() -> Self {
        Self {
            heading: Locator::new("heading", Selector::test_id("cases-heading"))
                .or(Selector::role_named("heading", "Cases")),
            search: Locator::new("search", Selector::test_id("case-search"))
                .or(Selector::placeholder("Search cases...")),
            status: Locator::new("status dropdown", Selector::test_id("status-dropdown")),
        }
    }
}

#[async_trait]
impl PageObject for CasesPage {
    fn path(&self) -> &str {
        "/cases"
    }

    fn ready_locator(&self) -> &Locator {
        &self.heading
    }

    fn page_name(&self) -> &str {
        "Cases"
    }
}

fn scripted_driver() -> Arc<MockDriver> {
    let driver = Arc::new(MockDriver::new());
    driver.after(Duration::from_millis(150), |dom| {
        dom.insert(MockElement::new("h", "h1").role("heading").text("Cases"));
        dom.insert(MockElement::new("q", "input").placeholder("Search cases..."));
        dom.insert(MockElement::new("dd", "div").test_id("status-dropdown"));
    });
    driver.on_click("dd", |dom| {
        dom.insert(MockElement::new("opt", "li").role("option").text("Escalated"));
    });
    driver
}

#[tokio::main]
async fn main() -> PagewrightResult<()> {
    let _ = pagewright::logging::init();
    println!("=== Page Object Model Example ===\n");

    let config = RuntimeConfig::with_overrides(
        Environment::Qa,
        ConfigOverrides::new().timeout_ms(5_000),
    )?;
    let driver = scripted_driver();
    let ctx = PageContext::new(driver.clone(), Arc::new(config));
    let page = CasesPage::new();

    println!("1. Opening {}...", page.page_name());
    page.open(&ctx).await?;
    println!("   URL: {}", driver.current_url().await.unwrap_or_default());

    println!("\n2. Resolving search box...");
    let resolution = ctx.chain().resolve(&page.search).await?;
    for attempt in &resolution.attempts {
        println!("   {attempt}");
    }

    println!("\n3. Searching and filtering...");
    let _ = ctx
        .actions()
        .fill(&page.search, "printer jam", &FillOptions::new().clear())
        .await?;
    let _ = ctx
        .actions()
        .select_custom(&page.status, "Escalated", None)
        .await?;

    println!("\n4. Asserting...");
    ctx.assertions().expect(&page.search).to_be_visible().await?;
    ctx.assertions().expect(&page.heading).to_have_text("Cases").await?;
    println!("   heading ok, search value = {:?}", ctx.actions().value_of(&page.search).await?);

    println!("\nDriver calls:");
    for call in driver.history() {
        println!("   {call}");
    }
    Ok(())
}
