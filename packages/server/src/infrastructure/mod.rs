//! Infrastructure 層
//!
//! ドメイン層が定義する trait（Repository, MessagePusher, PasswordHasher）の
//! 具体的な実装と、外部とやり取りする DTO を提供します。

pub mod dto;
pub mod hub;
pub mod password;
pub mod repository;
