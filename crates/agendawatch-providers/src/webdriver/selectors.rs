//! CSS selectors for the observed platform's markup.

/// The agenda widget. Its absence means the session is gone.
pub const AGENDA_WIDGET: &str = "[data-testid='components.Agenda.WidgetAgenda']";

/// One entry inside the agenda widget.
pub const EVENT_CARD: &str = "[data-testid='eventItem.card']";

pub const TIME_START: &str = "[data-testid='eventItem.timeStart']";
pub const TIME_END: &str = "[data-testid='eventItem.timeEnd']";
pub const TITLE: &str = "[data-testid='eventItem.title']";
pub const DESCRIPTION: &str = "[data-testid='eventItem.description']";

/// Badge shown on mandatory entries.
pub const MANDATORY_BADGE: &str = "[data-testid='components.MandatoryEventBadge']";

pub const USERNAME_FIELD: &str = "input[name='username']";
pub const PASSWORD_FIELD: &str = "input[name='password']";
pub const SUBMIT_BUTTON: &str = "button[type='submit'], input[type='submit']";
