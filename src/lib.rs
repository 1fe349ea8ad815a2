//! To-do list terminal client.
//!
//! A small ratatui front end for the todo REST API: fetches the task
//! collection on startup, renders it as a selectable list, and issues
//! update/delete/create/logout requests in response to key presses.
//!
//! State lives in [`app::App`] and is rendered by [`ui::draw`]; all network
//! traffic goes through [`api::ApiClient`].

/// REST client for the todo server
pub mod api;

/// Task-list state and action handlers
pub mod app;

/// Terminal rendering
pub mod ui;
