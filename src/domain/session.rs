use crate::domain::profile::{Balance, CustomerProfile};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A named state in the USSD menu state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    RequestList,
    DisplayItems,
    FinishOrder,
    Info,
    Quit,
}

impl Screen {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::RequestList => "request-list",
            Self::DisplayItems => "display-items",
            Self::FinishOrder => "finish-order",
            Self::Info => "info",
            Self::Quit => "quit",
        }
    }
}

/// Unrecognized stored values decode to `Home` so a corrupt or stale screen
/// pointer degrades to the default menu instead of failing the exchange.
impl From<&str> for Screen {
    fn from(value: &str) -> Self {
        match value {
            "request-list" => Self::RequestList,
            "display-items" => Self::DisplayItems,
            "finish-order" => Self::FinishOrder,
            "info" => Self::Info,
            "quit" => Self::Quit,
            _ => Self::Home,
        }
    }
}

impl Serialize for Screen {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Screen {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}

/// Per-session app state the provider hands back on the next exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub screen: Screen,
}

/// What the subscriber sees after one state-machine step. A terminal menu
/// ends the USSD session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub text: String,
    pub is_terminal: bool,
}

impl Menu {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_terminal: false,
        }
    }

    pub fn terminal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_terminal: true,
        }
    }
}

/// Side effect requested by a transition, run after the reply is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    None,
    /// Kick off loan disbursement for the given amount.
    Disburse(Balance),
}

/// Output of one state-machine step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next_screen: Screen,
    pub menu: Menu,
    /// Captured order list, when this step captures one.
    pub items: Option<Vec<String>>,
    pub action: SessionAction,
}

impl Transition {
    fn new(next_screen: Screen, menu: Menu) -> Self {
        Self {
            next_screen,
            menu,
            items: None,
            action: SessionAction::None,
        }
    }
}

const HOME_MENU: &str = "Welcome to My Groceries!\n1. Buy Some Groceries\n2. Quit";

/// Maps (current screen, subscriber input, profile) to the next screen, the
/// menu to render and any requested side effect. Pure; all state comes in
/// through the arguments and goes out through the returned transition.
///
/// Menu selections at `Home` route within the same exchange: pressing `1`
/// already shows the item prompt, so the stored screen jumps straight to
/// `DisplayItems`. Unrecognized input re-shows the current menu.
pub fn transition(screen: Screen, input: &str, profile: &CustomerProfile) -> Transition {
    let routed = match screen {
        Screen::Home => match input {
            "" if profile.has_active_loan() => Screen::Info,
            "1" => Screen::RequestList,
            "2" => Screen::Quit,
            _ => Screen::Home,
        },
        other => other,
    };

    match routed {
        Screen::Quit => Transition::new(Screen::Home, Menu::terminal("Thank you for shopping!")),
        Screen::Info => {
            let name = profile.name.as_deref().unwrap_or_default();
            let balance = profile.outstanding_balance();
            let text = if balance > Balance::ZERO {
                format!("Hey {name}, you still owe me KES {balance}!")
            } else {
                format!("Hey {name}, you have repaid your loan, good for you!")
            };
            Transition::new(Screen::Home, Menu::terminal(text))
        }
        Screen::RequestList => Transition::new(
            Screen::DisplayItems,
            Menu::prompt("Alright, what would you like delivered today? (separate each item with a space)"),
        ),
        Screen::DisplayItems => {
            let items: Vec<String> = input.split_whitespace().map(str::to_string).collect();
            let menu = Menu::prompt(format!(
                "Okay you selected these items:\n{}\nIs that correct?",
                items.join("\n")
            ));
            Transition {
                next_screen: Screen::FinishOrder,
                menu,
                items: Some(items),
                action: SessionAction::None,
            }
        }
        Screen::FinishOrder => {
            if input.eq_ignore_ascii_case("yes") {
                Transition {
                    next_screen: Screen::Home,
                    menu: Menu::terminal(
                        "Thanks for the order, we'll send you an SMS with the order amount.\nHave a nice day",
                    ),
                    items: None,
                    action: SessionAction::Disburse(profile.outstanding_balance()),
                }
            } else {
                Transition::new(
                    Screen::Home,
                    Menu::terminal("Thank you for using the service.\nHave a nice day"),
                )
            }
        }
        Screen::Home => Transition::new(Screen::Home, Menu::prompt(HOME_MENU)),
    }
}
