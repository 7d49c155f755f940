pub mod core {
    pub mod command;
    pub mod controller;
    pub mod domain;
    pub mod events;
    pub mod library;
    pub mod repository;
}

pub mod utils {
    pub mod date;
    pub mod ddb;
    pub mod locks;
    pub mod logs;
    pub mod memory;
}

pub mod gateway;

pub mod books {
    pub mod domain;
    pub mod dto;
    pub mod factory;
    pub mod repository;
}

pub mod catalog {
    pub mod command {
        pub mod add_book_cmd;
        pub mod get_book_cmd;
    }
    pub mod controller;
    pub mod domain;
    pub mod factory;
}

pub mod patrons;

pub mod notifications {
    pub mod command {
        pub mod list_unread_cmd;
        pub mod mark_read_cmd;
    }
    pub mod controller;
    pub mod domain;
    pub mod dto;
    pub mod factory;
    pub mod repository;
}

pub mod hold {
    pub mod command {
        pub mod cancel_hold_cmd;
        pub mod fulfill_hold_cmd;
        pub mod get_hold_cmd;
        pub mod list_item_queue_cmd;
        pub mod list_patron_holds_cmd;
        pub mod list_waiting_lists_cmd;
        pub mod place_hold_cmd;
        pub mod process_return_cmd;
        pub mod send_reminders_cmd;
        pub mod sweep_expired_cmd;
    }
    pub mod controller;
    pub mod domain;
    pub mod dto;
    pub mod factory;
    pub mod repository;
}

pub mod circulation {
    pub mod command {
        pub mod borrow_book_cmd;
        pub mod borrow_on_hold_cmd;
        pub mod return_book_cmd;
    }
    pub mod controller;
    pub mod domain;
    pub mod factory;
}
