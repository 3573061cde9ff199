//! Portfolio API Library
//!
//! Backend for a personal portfolio site: a chat endpoint grounded in the
//! static profile dataset (Gemini), and CORS-friendly proxies for the
//! Codeforces, LeetCode and CodeChef statistics APIs.
//!
//! # Modules
//!
//! - `adapters`: Pure upstream JSON to normalized stats transforms.
//! - `chat`: Grounding prompt construction and reply extraction.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `gemini_client`: Gemini `generateContent` client.
//! - `handlers`: HTTP request handlers and shared state.
//! - `middleware`: Origin allow-list guard.
//! - `models`: Request, response and normalized stats models.
//! - `profile`: Static profile dataset.
//! - `retry`: Retry with exponential backoff for upstream fetches.
//! - `routes`: Router assembly, CORS and API docs.
//! - `services`: Stats provider clients (Codeforces, LeetCode, CodeChef).

pub mod adapters;
pub mod chat;
pub mod config;
pub mod errors;
pub mod gemini_client;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod profile;
pub mod retry;
pub mod routes;
pub mod services;
