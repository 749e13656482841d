// Plain string errors. Most of the statement handling only ever needs to
// surface a message to the user, so there is little value in typed errors.
pub type SError = String;
