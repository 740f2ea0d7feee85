//! # Jardim Privé server
//! This crate hosts the REST server for the Jardim Privé back office. It is responsible for:
//! * Authenticating users (e-mail and password, then a bearer token on every call).
//! * Exposing the catalog, order, payment, rewards and report flows of [`jardim_engine`] under `/api`.
//! * Receiving payment notifications from the payment gateway on `/webhook/payment`.
//! * Flagging overdue payments in the background.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! Public routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/auth/register` and `/auth/login`: Sign-up and sign-in. Login returns the access token.
//! * `/webhook/payment`: The payment gateway webhook.
//!
//! Every other route lives under `/api` and needs an `Authorization: Bearer <token>` header. See [routes] for the
//! full list and the roles each route requires.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod overdue_worker;
pub mod routes;
pub mod server;
