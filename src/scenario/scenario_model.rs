use serde::{Deserialize, Serialize};

/// A named sequence of natural-language steps against one logical page.
/// Deserialized from YAML for execution with `locator-cache run`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Human-readable name for this scenario
    pub name: String,

    /// URL to navigate to before executing steps
    pub start_url: String,

    /// Page key the discovered locators are stored under
    pub page: String,

    /// Ordered list of steps to execute
    pub steps: Vec<ScenarioStep>,

    /// Selector checked for visibility after all steps ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<String>,
}

/// One instruction, optionally tied to a repository object name.
///
/// Only steps with an object name are cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioStep {
    pub instruction: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

impl ScenarioStep {
    pub fn new(instruction: &str, object: Option<&str>) -> Self {
        Self {
            instruction: instruction.to_string(),
            object: object.map(str::to_string),
        }
    }
}

impl Scenario {
    /// Built-in scenario used when no scenario file is given: log in to the
    /// Swag Labs demo shop and check the products page shows up.
    pub fn demo_login() -> Self {
        Scenario {
            name: "Swag Labs login".into(),
            start_url: "https://www.saucedemo.com/".into(),
            page: "LoginPage".into(),
            steps: vec![
                ScenarioStep::new("Fill username field with 'standard_user'", Some("UsernameField")),
                ScenarioStep::new("Fill password field with 'secret_sauce'", Some("PasswordField")),
                ScenarioStep::new("Click the Login button to submit", Some("LoginButton")),
                ScenarioStep::new("Verify Products page is visible (login success)", None),
            ],
            verify: Some("text=Products".into()),
        }
    }
}

/// Load a scenario from a YAML file.
pub fn load_scenario(path: &str) -> Result<Scenario, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let scenario: Scenario = serde_yaml::from_str(&content)?;
    Ok(scenario)
}
