use fractic_server_error::{define_client_error, define_internal_error};

// IO-related.
define_client_error!(ReadError, "Error reading file.");
define_internal_error!(WriteError, "Error writing file: {path}.", { path: &str });

// Parsing-related.
define_client_error!(InvalidJson, "Invalid {json_type} (invalid JSON format).", { json_type: &str });
define_client_error!(InvalidRon, "Invalid {ron_type} (invalid RON format).", { ron_type: &str });
define_client_error!(InvalidDate, "Invalid date: {date}.", { date: &str });
define_client_error!(InvalidPaymentKey, "Invalid payment key: '{key}'.", { key: &str });
define_client_error!(InvalidRecordType, "Invalid record type: '{value}'. Expected 'income' or 'expense'.", { value: &str });
define_internal_error!(
    StoreSerializationError,
    "Could not serialize {document_type} for storage.",
    { document_type: &str }
);
define_internal_error!(CsvWriteError, "Error writing CSV output.");

// Validation.
define_client_error!(MissingRequiredField, "Missing required field: '{field}'.", { field: &str });
define_client_error!(InvalidAmount, "Invalid amount: '{value}'.", { value: &str });
define_client_error!(
    InvalidPrice,
    "Invalid price: {value}. Prices must be finite and not negative.",
    { value: f64 }
);
define_client_error!(
    InvalidMonthIndex,
    "Invalid month index: {month}. Expected a value between 0 and 11.",
    { month: i64 }
);
define_client_error!(DuplicateRecordId, "A financial record with id '{id}' already exists.", { id: &str });
define_client_error!(DuplicateAthleteId, "Athlete id '{id}' appears more than once.", { id: &str });

// Authorization.
define_client_error!(
    ElevatedAuthorizationRejected,
    "Invalid security code. The action was not performed."
);

// Lookups.
define_client_error!(SectionNotFound, "Section '{id}' does not exist.", { id: &str });
define_client_error!(AthleteNotFound, "Athlete '{id}' does not exist.", { id: &str });
