//! Round-trip test for `GpgEncryptor` against a real `gpg` binary.
//!
//! Runs entirely inside ephemeral `GNUPGHOME` directories with throwaway
//! generated keys: one keyring per identity, so decryption can be attempted
//! with exactly one private key at a time. The whole flow lives in a single
//! test function because the encryptor reads `GNUPGHOME` from the process
//! environment.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use git_keeper::contract::Encryptor;
use git_keeper::encrypt::GpgEncryptor;

fn gpg(home: &Path, args: &[&str]) -> Output {
    Command::new("gpg")
        .env("GNUPGHOME", home)
        .args(args)
        .output()
        .expect("failed to launch gpg")
}

fn gpg_ok(home: &Path, args: &[&str]) -> Output {
    let output = gpg(home, args);
    assert!(
        output.status.success(),
        "gpg {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn make_home(base: &Path, name: &str) -> std::path::PathBuf {
    let home = base.join(name);
    fs::create_dir_all(&home).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&home, fs::Permissions::from_mode(0o700)).unwrap();
    }
    home
}

fn generate_key(home: &Path, user: &str) {
    gpg_ok(
        home,
        &[
            "--batch",
            "--pinentry-mode",
            "loopback",
            "--passphrase",
            "",
            "--quick-generate-key",
            user,
            "default",
            "default",
            "never",
        ],
    );
}

/// Export `user`'s public key from `from` and import it into `into`, marking
/// it ultimately trusted so encryption does not stop on an unknown key.
fn share_public_key(from: &Path, into: &Path, user: &str) {
    let exported = gpg_ok(from, &["--export", user]).stdout;
    let key_file = into.join(format!("{user}.pub"));
    fs::write(&key_file, exported).unwrap();
    gpg_ok(into, &["--import", key_file.to_str().unwrap()]);

    let listing = gpg_ok(into, &["--list-keys", "--with-colons", user]).stdout;
    let fingerprint = String::from_utf8_lossy(&listing)
        .lines()
        .find(|line| line.starts_with("fpr:"))
        .and_then(|line| line.split(':').nth(9).map(str::to_string))
        .expect("no fingerprint in gpg listing");

    let mut child = Command::new("gpg")
        .env("GNUPGHOME", into)
        .arg("--import-ownertrust")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(format!("{fingerprint}:6:\n").as_bytes())
        .unwrap();
    assert!(child.wait().unwrap().success());
}

fn decrypt(home: &Path, ciphertext: &Path, output: &Path) -> Output {
    gpg(
        home,
        &[
            "--batch",
            "--pinentry-mode",
            "loopback",
            "--passphrase",
            "",
            "--decrypt",
            "--output",
            output.to_str().unwrap(),
            ciphertext.to_str().unwrap(),
        ],
    )
}

#[tokio::test]
async fn every_recipient_can_decrypt_but_a_non_recipient_cannot() {
    if Command::new("gpg").arg("--version").output().is_err() {
        eprintln!("gpg not available, skipping");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let alice_home = make_home(dir.path(), "alice");
    let bob_home = make_home(dir.path(), "bob");
    let carol_home = make_home(dir.path(), "carol");

    generate_key(&alice_home, "alice@example.com");
    generate_key(&bob_home, "bob@example.com");
    generate_key(&carol_home, "carol@example.com");

    // Alice's keyring encrypts; she needs bob's public key, carol stays out.
    share_public_key(&bob_home, &alice_home, "bob@example.com");

    // Arbitrary binary payload standing in for the tar archive.
    let archive_path = dir.path().join("widget.git.tar");
    let payload: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    fs::write(&archive_path, &payload).unwrap();

    std::env::set_var("GNUPGHOME", &alice_home);
    let recipients = vec![
        "alice@example.com".to_string(),
        "bob@example.com".to_string(),
    ];
    let ciphertext_path = GpgEncryptor
        .encrypt(&archive_path, &recipients)
        .await
        .unwrap();

    let ciphertext = fs::read(&ciphertext_path).unwrap();
    assert!(!ciphertext.is_empty());
    assert_ne!(ciphertext, payload);
    // Binary output, no ASCII armor.
    assert!(!ciphertext.starts_with(b"-----BEGIN PGP"));

    // Each recipient independently recovers a byte-identical archive.
    let alice_out = dir.path().join("alice.tar");
    let result = decrypt(&alice_home, &ciphertext_path, &alice_out);
    assert!(
        result.status.success(),
        "alice failed to decrypt: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert_eq!(fs::read(&alice_out).unwrap(), payload);

    let bob_out = dir.path().join("bob.tar");
    let result = decrypt(&bob_home, &ciphertext_path, &bob_out);
    assert!(
        result.status.success(),
        "bob failed to decrypt: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    assert_eq!(fs::read(&bob_out).unwrap(), payload);

    // Carol was not a recipient; her key cannot open it.
    let carol_out = dir.path().join("carol.tar");
    let result = decrypt(&carol_home, &ciphertext_path, &carol_out);
    assert!(
        !result.status.success(),
        "non-recipient unexpectedly decrypted the artifact"
    );
    assert!(!carol_out.exists());
}
