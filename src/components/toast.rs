use gloo_timers::future::TimeoutFuture;
use leptos::{component, spawn_local, view, IntoView, ReadSignal, SignalGet, SignalGetUntracked, SignalSet, WriteSignal};
use crate::constants::TOAST_DURATION_MS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub visible: bool,
    /// Distinguishes consecutive toasts with the same text
    pub serial: u32,
}

impl Toast {
    #[must_use]
    pub fn new(message: String, kind: ToastKind, serial: u32) -> Self {
        Self {
            message,
            kind,
            visible: true,
            serial,
        }
    }
}

/// Shows a transient notice that hides itself unless replaced in the meantime
pub fn show_toast(toast: ReadSignal<Toast>, set_toast: WriteSignal<Toast>, message: impl Into<String>, kind: ToastKind) {
    let serial = toast.get_untracked().serial.wrapping_add(1);
    set_toast.set(Toast::new(message.into(), kind, serial));
    spawn_local(async move {
        TimeoutFuture::new(TOAST_DURATION_MS).await;
        if let Some(current) = toast.try_get_untracked() {
            if current.serial == serial {
                let _ = set_toast.try_set(Toast { visible: false, ..current });
            }
        }
    });
}

#[component]
#[must_use]
pub fn ToastNotification(toast: ReadSignal<Toast>) -> impl IntoView {
    view! {
        {move || {
            let t = toast.get();
            let class = match (t.visible, t.kind) {
                (false, _) => "toast",
                (true, ToastKind::Info) => "toast toast-visible",
                (true, ToastKind::Error) => "toast toast-visible toast-error",
            };
            view! { <div class=class>{t.message}</div> }
        }}
    }
}
