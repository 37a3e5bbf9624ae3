//! Command-line interface of the `bazaar` binary.

use std::path::PathBuf;

/// Command-line client for the Bazaar marketplace
#[derive(Debug, clap::Parser)]
#[command(name = "bazaar")]
#[command(about = "Browse, post and moderate Bazaar listings from the terminal")]
#[command(
    long_about = "Browse, post and moderate Bazaar listings from the terminal.\n\n\
    The login session is kept in BAZAAR_SESSION_FILE so later invocations stay \
    signed in; expired access tokens are refreshed transparently."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, clap::Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login { email: String, password: String },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    #[command(name = "whoami")]
    WhoAmI,

    /// Create an account
    Register {
        email: String,
        firstname: String,
        lastname: String,
        password: String,
        phone: String,
    },

    /// List approved listings, one page at a time
    Items {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        page: Option<u32>,
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,
    },

    /// Show one listing
    Item { id: String },

    /// Keyword search over listings
    Search {
        /// Remaining words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Natural-language search
    Ask {
        /// Remaining words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show the category catalogue served by the backend
    Categories,

    /// Your own listings
    MyItems,

    /// Your favorite listings
    Favorites,

    /// Add a listing to your favorites
    Favorite { id: String },

    /// Remove a listing from your favorites
    Unfavorite { id: String },

    /// Post a new listing
    Post {
        name: String,
        price: String,
        category: String,
        #[arg(value_name = "SUB_CATEGORY")]
        sub_category: String,
        /// Image files to upload with the listing
        images: Vec<PathBuf>,
    },

    /// Mark a listing as sold
    Sold { id: String },

    /// Delete a listing
    Delete { id: String },

    /// Every listing regardless of status (admin)
    AdminItems,

    /// Every user account (admin)
    AdminUsers,

    /// Approve a pending listing (admin)
    Approve { id: String },

    /// Reject a pending listing (admin)
    Reject { id: String },

    /// Grant the admin role (admin)
    MakeAdmin { id: String },

    /// Revoke the admin role (admin)
    RemoveAdmin { id: String },

    /// Delete a user account (admin)
    DeleteUser { id: String },
}
