use std::fmt;

/// What asked for a show or hide. Only some triggers carry extra guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ShowingOverview,
    HidingOverview,
    MouseLeft,
    MouseEnter,
    Intellihide,
    Shortcut,
    HotCornerSettingChanged,
    Init,
    Destroy,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::ShowingOverview => "showing-overview",
            Trigger::HidingOverview => "hiding-overview",
            Trigger::MouseLeft => "mouse-left",
            Trigger::MouseEnter => "mouse-enter",
            Trigger::Intellihide => "intellihide",
            Trigger::Shortcut => "shortcut",
            Trigger::HotCornerSettingChanged => "hot-corner-setting-changed",
            Trigger::Init => "init",
            Trigger::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
