use std::str::FromStr;

use anyhow::{Context, Result};
use thirtyfour::prelude::*;

/// Browsers the page is exercised in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Browser {
    Chrome,
    Firefox,
    Safari,
}

impl FromStr for Browser {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "chrome" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            "safari" => Ok(Self::Safari),
            other => anyhow::bail!("unsupported browser `{other}`, use chrome, firefox or safari"),
        }
    }
}

/// Where the driver and the tick page live, read from the environment.
#[derive(Debug)]
struct Config {
    browser: Browser,
    webdriver_url: String,
    page_url: String,
    /// A page served without `index.wasm`, for the inert-button scenario.
    missing_module_url: Option<String>,
    chrome_path: Option<String>,
}

impl Config {
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let browser = lookup("E2E_BROWSER")
            .as_deref()
            .unwrap_or("chrome")
            .parse()?;
        let webdriver_port = lookup("WEBDRIVER_PORT").unwrap_or_else(|| "4444".to_string());
        let webapp_port = lookup("WEBAPP_PORT").unwrap_or_else(|| "8080".to_string());

        Ok(Self {
            browser,
            webdriver_url: format!("http://localhost:{webdriver_port}"),
            page_url: format!("http://localhost:{webapp_port}"),
            missing_module_url: lookup("E2E_MISSING_MODULE_URL"),
            chrome_path: lookup("CHROME_PATH"),
        })
    }
}

/// Open a session for `config.browser`, headless where the driver allows it.
async fn connect(config: &Config) -> Result<WebDriver> {
    let url = config.webdriver_url.as_str();
    let driver = match config.browser {
        // safaridriver has no headless mode
        Browser::Safari => WebDriver::new(url, DesiredCapabilities::safari()).await?,
        Browser::Firefox => {
            let mut caps = DesiredCapabilities::firefox();
            caps.set_headless()?;
            WebDriver::new(url, caps).await?
        }
        Browser::Chrome => {
            let mut caps = DesiredCapabilities::chrome();
            caps.set_headless()?;
            caps.add_arg("--no-sandbox")?;
            if let Some(path) = &config.chrome_path {
                caps.set_binary(path)?;
            }
            WebDriver::new(url, caps).await?
        }
    };
    Ok(driver)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    println!("Connecting to {:?} via {}", config.browser, config.webdriver_url);
    let driver = connect(&config)
        .await
        .with_context(|| format!("no webdriver session at {}", config.webdriver_url))?;

    let outcome = run(&driver, &config).await;
    driver.quit().await?;
    outcome
}

async fn wait_until_ready(driver: &WebDriver) -> Result<WebElement> {
    let button = driver
        .query(By::Css("#add[data-state='ready']"))
        .wait(
            std::time::Duration::from_secs(10),
            std::time::Duration::from_millis(100),
        )
        .first()
        .await?;
    Ok(button)
}

async fn click_times(driver: &WebDriver, button: &WebElement, times: usize) -> Result<String> {
    for _ in 0..times {
        button.click().await?;
    }
    // Wait a moment for the UI to update
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    Ok(driver.find(By::Id("result")).await?.text().await?)
}

async fn run(driver: &WebDriver, config: &Config) -> Result<()> {
    let webapp_url = config.page_url.as_str();

    // Test 1: one click after the module is ready
    println!("Loading page and waiting for the module...");
    driver.goto(webapp_url).await?;
    let button = wait_until_ready(driver).await?;

    let result = click_times(driver, &button, 1).await?;
    assert_eq!(result, "2", "Result should be 2 after one click");

    // Test 2: three clicks on a fresh page
    println!("Testing three clicks...");
    driver.goto(webapp_url).await?;
    let button = wait_until_ready(driver).await?;

    driver.find(By::Id("number1")).await?.send_keys("2").await?;
    driver.find(By::Id("number2")).await?.send_keys("5").await?;

    let result = click_times(driver, &button, 3).await?;
    assert_eq!(result, "4", "Result should be 4 after three clicks");

    // Test 3: a page whose module is missing never gets a handler
    if let Some(missing_url) = &config.missing_module_url {
        println!("Testing page without a module...");
        driver.goto(missing_url).await?;
        tokio::time::sleep(tokio::time::Duration::from_secs(2)).await;

        let button = driver.find(By::Id("add")).await?;
        let state = button.attr("data-state").await?;
        assert_eq!(state.as_deref(), Some("uninitialized"));

        button.click().await?;
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let result = driver.find(By::Id("result")).await?.text().await?;
        assert_eq!(result, "", "Clicking without a handler should not change the result");
    } else {
        println!("Skipping missing module test (E2E_MISSING_MODULE_URL not set)");
    }

    println!("All tests passed!");

    Ok(())
}
