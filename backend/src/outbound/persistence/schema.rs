//! Diesel table definitions mirroring `backend/migrations`.

diesel::table! {
    roles (id) {
        id -> Int8,
        #[max_length = 255]
        name -> Varchar,
        description -> Text,
        level -> Int4,
    }
}

diesel::table! {
    users (id) {
        id -> Int8,
        #[max_length = 100]
        username -> Varchar,
        #[max_length = 255]
        email -> Varchar,
        password -> Text,
        created_at -> Timestamptz,
        is_active -> Bool,
        role_id -> Int8,
    }
}

diesel::table! {
    user_invitations (token, user_id) {
        #[max_length = 64]
        token -> Varchar,
        user_id -> Int8,
        expiry -> Timestamptz,
    }
}

diesel::joinable!(users -> roles (role_id));

diesel::allow_tables_to_appear_in_same_query!(roles, users, user_invitations);
