use super::*;
use crate::{BufferAllocator, BufferError, HeapAllocator, HeapBuffer, PixelFormat};

fn bgra(width: usize, height: usize) -> HeapBuffer {
    HeapAllocator::with_row_alignment(16)
        .create_buffer(width, height, PixelFormat::BGRA32, None)
        .unwrap()
}

#[test]
fn read_lock_releases_on_drop() {
    let buf = bgra(3, 2);
    {
        let guard = ReadLock::new(&buf).unwrap();
        assert_eq!(guard.buffer().lock_state(), Some((LockMode::ReadOnly, 1)));
        assert_eq!(guard.bytes(Region::Whole).map(<[u8]>::len), Some(32));
        assert!(guard.bytes(Region::Plane(0)).is_none());
    }
    assert!(!buf.is_locked());
}

#[test]
fn read_locks_nest() {
    let buf = bgra(1, 1);
    let a = ReadLock::new(&buf).unwrap();
    let b = ReadLock::new(&buf).unwrap();
    assert_eq!(buf.lock_state(), Some((LockMode::ReadOnly, 2)));
    drop(a);
    drop(b);
    assert!(!buf.is_locked());
}

#[test]
fn write_lock_writes_and_releases() {
    let mut buf = bgra(2, 2);
    {
        let mut guard = WriteLock::new(&mut buf).unwrap();
        let bytes = guard.bytes_mut(Region::Whole).unwrap();
        assert_eq!(bytes.len(), 32);
        bytes[0] = 0xAB;
        bytes[31] = 0xCD;
        assert_eq!(guard.bytes(Region::Whole).unwrap()[0], 0xAB);
    }
    assert!(!buf.is_locked());

    let guard = ReadLock::new(&buf).unwrap();
    let bytes = guard.bytes(Region::Whole).unwrap();
    assert_eq!((bytes[0], bytes[31]), (0xAB, 0xCD));
}

#[test]
fn failed_lock_leaves_buffer_as_it_was() {
    let mut buf = bgra(1, 1);
    buf.lock(LockMode::ReadOnly).unwrap();
    assert!(matches!(
        WriteLock::new(&mut buf),
        Err(BufferError::Lock(_))
    ));
    assert_eq!(buf.lock_state(), Some((LockMode::ReadOnly, 1)));
    buf.unlock(LockMode::ReadOnly).unwrap();
}

#[test]
fn guard_tolerates_unlock_failure_on_drop() {
    let buf = bgra(1, 1);
    let guard = ReadLock::new(&buf).unwrap();
    // Someone released the lock behind the guard's back; dropping must not panic.
    buf.unlock(LockMode::ReadOnly).unwrap();
    drop(guard);
    assert!(!buf.is_locked());
}
