//! Command implementations.
//!
//! Each command works on a mounted session and writes its report to stdout.
//! Toasts are collected by the session's notifier and printed once the
//! command finishes.

pub mod auth;
pub mod cart;
pub mod products;
pub mod wishlist;

use tindahan_storefront::notify::{Toast, ToastLevel};

/// Print toasts, one per line, with a level marker.
#[allow(clippy::print_stdout)]
pub fn print_toasts(toasts: &[Toast]) {
    for toast in toasts {
        let marker = match toast.level {
            ToastLevel::Success => "✓",
            ToastLevel::Info => "i",
            ToastLevel::Error => "✗",
        };
        println!("{marker} {}", toast.message);
    }
}
