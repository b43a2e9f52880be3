pub type TrySendError<T> = tokio::sync::mpsc::error::TrySendError<T>;
pub type SendError<T> = tokio::sync::mpsc::error::SendError<T>;

pub type Receiver<T> = tokio::sync::mpsc::Receiver<T>;
pub type Sender<T> = tokio::sync::mpsc::Sender<T>;

pub type OneshotReceiver<T> = tokio::sync::oneshot::Receiver<T>;
pub type OneshotSender<T> = tokio::sync::oneshot::Sender<T>;

pub fn bounded<T>(cap: usize) -> (Sender<T>, Receiver<T>) {
    tokio::sync::mpsc::channel(cap)
}

/// Single-use reply channel for request/response commands.
pub fn reply<T>() -> (OneshotSender<T>, OneshotReceiver<T>) {
    tokio::sync::oneshot::channel()
}
