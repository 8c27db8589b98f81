use workflow_tests::BackOffice;

/// A running back office with a signed-in staff session.
pub async fn setup() -> BackOffice {
    let mut office = BackOffice::spawn()
        .await
        .expect("Failed to start the back office");
    office
        .sign_in_as_staff("ana", "s3cret-pass")
        .await
        .expect("Failed to sign in");
    office
}
