//! # Log Messages
//!
//! Format functions for operator-facing log lines (startup, sync loop, dispatch).

pub const UNKNOWN_USER: &str = "<unknown>";

pub fn config_loaded(path: &str, user: &str) -> String {
    format!("Loaded configuration from {path} for user: {user}")
}

pub fn registry_built(commands: usize, modules: usize) -> String {
    format!("Registered {commands} commands from {modules} modules")
}

pub fn startup_failed(code: &str, err: &str) -> String {
    format!("Startup failed [{code}]: {err}")
}

pub fn store_opened(version: &str) -> String {
    format!("Storage ready: {version}")
}

pub const LOGIN_SUCCESS: &str = "Session restored successfully!";

pub fn setting_display_name(name: &str) -> String {
    format!("Setting display name to: {name}")
}

pub fn set_display_name_fail(err: &str) -> String {
    format!("Failed to set display name: {err}")
}

pub const SYNC_LOOP_START: &str = "Starting sync loop...";

pub fn sync_loop_fail(err: &str) -> String {
    format!("Sync loop failed: {err}")
}

pub fn invite_received(room_id: &str) -> String {
    format!("💌 Received invite for room {room_id:?}")
}

pub fn join_invite_fail(err: &str) -> String {
    format!("Failed to join room after invite: {err}")
}

pub fn command_used(user: &str, command: &str, args: &str, room: &str) -> String {
    format!("User {user} used command {command}({args}) in {room}")
}

pub fn reply_received(user: &str, replied_to: &str, body: &str, room: &str) -> String {
    format!("User {user} replied to {replied_to}: {body} ({room})")
}

pub fn unknown_command(command: &str) -> String {
    format!("Ignoring unknown command {command:?}")
}

pub fn command_denied(user: &str, command: &str, room: &str) -> String {
    format!("Denied {command} for {user} in {room}")
}

pub fn refusal_failed(user: &str, command: &str, room: &str, err: &str) -> String {
    format!("Failed to refuse {command} for {user} in {room}: {err}")
}

pub fn command_failed(user: &str, command: &str, room: &str, err: &str) -> String {
    format!("Command {command} from {user} in {room} failed: {err}")
}

pub const SHUTDOWN: &str = "Received Ctrl-C, shutting down";

pub fn shutdown_fail(err: &str) -> String {
    format!("Failed to listen for shutdown signal: {err}")
}
