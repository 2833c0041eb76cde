diesel::table! {
    raw_data.orders (id) {
        id -> Int4,
        order_id -> Varchar,
        created_at -> Timestamp,
        status -> Varchar,
        value -> Numeric,
        payment_method -> Varchar,
        created_at_pipeline -> Nullable<Timestamp>,
    }
}
