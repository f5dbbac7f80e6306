//! Diesel schema for project examination persistence.

diesel::table! {
    /// Repository-bound projects and their examination state.
    projects (id) {
        /// Opaque project identifier.
        #[max_length = 64]
        id -> Varchar,
        /// Owning user identifier.
        #[max_length = 255]
        user_id -> Varchar,
        /// Provider-issued repository identifier.
        repo_id -> BigInt,
        /// Repository name in `owner/repo` format.
        #[max_length = 255]
        repo_name -> Varchar,
        /// Examination lifecycle status.
        #[max_length = 20]
        examination_status -> Varchar,
        /// Last recorded commit hash.
        #[max_length = 64]
        commit_hash -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Git provider credentials, one per user.
    git_connections (user_id) {
        /// Owning user identifier.
        #[max_length = 255]
        user_id -> Varchar,
        /// Git provider name.
        #[max_length = 20]
        provider -> Varchar,
        /// Provider access token.
        access_token -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
