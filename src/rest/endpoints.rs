//! SteamBots REST API endpoint constants.

/// Base URL for the SteamBots REST API.
pub const STEAMBOTS_API_URL: &str = "https://api.steambots.io";

/// List the bots attached to the account.
pub const BOTS: &str = "/bots";
/// List trades; single trades live under `/trades/{id}`.
pub const TRADES: &str = "/trades";
/// Create deposit trades.
pub const DEPOSITS: &str = "/deposits";
/// Create withdrawal trades.
pub const WITHDRAWALS: &str = "/withdrawals";
/// Load a Steam user's inventory, as `/inventory/{steam_id}`.
pub const INVENTORY: &str = "/inventory";
/// List items held by the bots.
pub const ITEMS: &str = "/items";

/// Path of a single trade.
pub(crate) fn trade(trade_id: &str) -> String {
    format!("{}/{}", TRADES, trade_id)
}

/// Path of the resend action for a trade.
pub(crate) fn trade_resend(trade_id: &str) -> String {
    format!("{}/{}/resend", TRADES, trade_id)
}

/// Path of a Steam user's inventory.
pub(crate) fn inventory(steam_id: &str) -> String {
    format!("{}/{}", INVENTORY, steam_id)
}
