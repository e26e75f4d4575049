use chie_core::crypto::{decrypt_record, encrypt_record, open, seal, Envelope, SymmetricKey};
use chie_core::storage::Task;
use chie_core::vault::MasterKey;
use proptest::prelude::*;

proptest! {
    #[test]
    fn seal_open_always_roundtrips(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let key = MasterKey::generate();
        let envelope = seal(&key, &payload).unwrap();
        let opened = open(&key, &envelope).unwrap();
        prop_assert_eq!(opened.to_vec(), payload);
    }

    #[test]
    fn compact_form_roundtrips(payload in proptest::collection::vec(any::<u8>(), 0..256)) {
        let key = MasterKey::generate();
        let envelope = seal(&key, &payload).unwrap();
        let parsed = Envelope::from_bytes(&envelope.to_bytes()).unwrap();
        prop_assert_eq!(&parsed, &envelope);
        prop_assert_eq!(open(&key, &parsed).unwrap().to_vec(), payload);
    }

    #[test]
    fn task_records_roundtrip(text in ".{0,64}", completed in any::<bool>()) {
        let key = MasterKey::generate();
        let mut task = Task::new(text);
        task.completed = completed;
        let envelope = encrypt_record(&key, &task).unwrap();
        let decrypted: Task = decrypt_record(&key, &envelope).unwrap();
        prop_assert_eq!(decrypted, task);
    }

    #[test]
    fn other_keys_never_open(payload in proptest::collection::vec(any::<u8>(), 1..128)) {
        let key = MasterKey::generate();
        let other = MasterKey::generate();
        prop_assume!(key.key_bytes() != other.key_bytes());
        let envelope = seal(&key, &payload).unwrap();
        prop_assert!(open(&other, &envelope).is_err());
    }
}
